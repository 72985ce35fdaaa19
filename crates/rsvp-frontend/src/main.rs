use rsvp::platform::browser;

fn main() {
    browser::start();
}
