//! Which optional parts of the RSVP form are shown.

use crate::record::{Field, FormValues, YesNo};

/// Form regions whose visibility depends on other answers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    AttendanceDetails,
    PlusOneName,
    AdditionalGuestsCount,
}

impl Section {
    pub const ALL: [Section; 3] = [
        Section::AttendanceDetails,
        Section::PlusOneName,
        Section::AdditionalGuestsCount,
    ];

    /// Value of the `data-conditional` attribute marking the section.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AttendanceDetails => "attendance-details",
            Self::PlusOneName => "plus-one-name",
            Self::AdditionalGuestsCount => "additional-guests-count",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|section| section.name() == name)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VisibleSections {
    pub attendance_details: bool,
    pub plus_one_name: bool,
    pub additional_guests_count: bool,
}

impl VisibleSections {
    pub fn is_visible(&self, section: Section) -> bool {
        match section {
            Section::AttendanceDetails => self.attendance_details,
            Section::PlusOneName => self.plus_one_name,
            Section::AdditionalGuestsCount => self.additional_guests_count,
        }
    }
}

pub fn visible_sections(
    attending: Option<YesNo>,
    bringing_plus_one: Option<YesNo>,
    additional_guests: Option<YesNo>,
) -> VisibleSections {
    let attending = attending == Some(YesNo::Yes);
    VisibleSections {
        attendance_details: attending,
        plus_one_name: attending && bringing_plus_one == Some(YesNo::Yes),
        additional_guests_count: attending && additional_guests == Some(YesNo::Yes),
    }
}

pub fn visible_sections_for(values: &FormValues) -> VisibleSections {
    visible_sections(
        YesNo::parse(values.get(Field::Attending)),
        YesNo::parse(values.get(Field::BringingPlusOne)),
        YesNo::parse(values.get(Field::AdditionalGuests)),
    )
}
