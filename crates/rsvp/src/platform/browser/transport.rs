//! Network side of RSVP delivery: `no-cors` fetch and callback-script injection.

use std::cell::RefCell;
use std::rc::Rc;

use futures_channel::oneshot;
use url::Url;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlScriptElement, RequestInit, RequestMode};
use zoon::Task;

use crate::remote::{CallbackId, CallbackRegistry, PendingDelivery, RemoteOutcome, Transport};

#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserTransport;

impl Transport for BrowserTransport {
    fn fetch_opaque(&self, url: &Url) -> PendingDelivery {
        let Some(window) = web_sys::window() else {
            return Box::pin(async { RemoteOutcome::NetworkError });
        };
        let init = RequestInit::new();
        init.set_method("GET");
        init.set_mode(RequestMode::NoCors);
        let promise = window.fetch_with_str_and_init(url.as_str(), &init);

        let (sender, receiver) = oneshot::channel();
        let sender = Rc::new(RefCell::new(Some(sender)));
        let settle = move |outcome: RemoteOutcome| {
            if let Some(sender) = sender.borrow_mut().take() {
                let _ = sender.send(outcome);
            }
        };
        let on_fulfilled = Closure::<dyn FnMut(JsValue)>::new({
            let settle = settle.clone();
            move |_response: JsValue| settle(RemoteOutcome::Success)
        });
        let on_rejected = Closure::<dyn FnMut(JsValue)>::new(move |error: JsValue| {
            zoon::eprintln!("RSVP delivery failed: {error:?}");
            settle(RemoteOutcome::NetworkError)
        });
        let _ = promise.then2(&on_fulfilled, &on_rejected);

        Box::pin(async move {
            let outcome = receiver.await.unwrap_or(RemoteOutcome::NetworkError);
            // The promise handlers must live until the promise settles.
            drop((on_fulfilled, on_rejected));
            outcome
        })
    }

    fn load_script(&self, url: &Url, id: CallbackId, callbacks: Rc<CallbackRegistry>) {
        let Some((window, document)) = web_sys::window().and_then(|window| {
            let document = window.document()?;
            Some((window, document))
        }) else {
            callbacks.settle(id, RemoteOutcome::NetworkError);
            return;
        };
        let Some(script) = document
            .create_element("script")
            .ok()
            .and_then(|element| element.dyn_into::<HtmlScriptElement>().ok())
        else {
            zoon::eprintln!("Failed to create RSVP callback script element");
            callbacks.settle(id, RemoteOutcome::NetworkError);
            return;
        };
        let Some(parent) = document.body() else {
            callbacks.settle(id, RemoteOutcome::NetworkError);
            return;
        };

        let callback_name = id.callback_name();
        let on_response = Closure::<dyn FnMut(JsValue)>::new({
            let callbacks = callbacks.clone();
            move |data: JsValue| {
                log::debug!("RSVP endpoint answered: {data:?}");
                callbacks.settle(id, RemoteOutcome::Success);
            }
        });
        let on_error = Closure::<dyn FnMut(web_sys::Event)>::new({
            let callbacks = callbacks.clone();
            move |_event: web_sys::Event| {
                zoon::eprintln!("RSVP callback script failed to load");
                callbacks.settle(id, RemoteOutcome::NetworkError);
            }
        });

        if js_sys::Reflect::set(&window, &callback_name.as_str().into(), on_response.as_ref()).is_err() {
            zoon::eprintln!("Failed to register {callback_name}");
            callbacks.settle(id, RemoteOutcome::NetworkError);
            return;
        }
        script.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        script.set_async(true);
        script.set_src(url.as_str());

        callbacks.on_settle(id, {
            let script = script.clone();
            Box::new(move || {
                script.set_onerror(None);
                script.remove();
                let _ = js_sys::Reflect::delete_property(&window, &callback_name.as_str().into());
                // Settlement may run inside one of these closures; free them afterwards.
                Task::start(async move { drop((on_response, on_error)) });
            })
        });

        if parent.append_child(&script).is_err() {
            callbacks.settle(id, RemoteOutcome::NetworkError);
        }
    }
}
