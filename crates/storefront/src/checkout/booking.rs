//! Service booking step validator.
//!
//! Five linear steps: `ServiceType -> Vehicle -> Location -> Schedule ->
//! Contact`, with the same forward-guarded / backward-free discipline as
//! the checkout wizard. Time slots come from a fixed list where each slot
//! carries its own availability flag; an unavailable slot is never
//! selectable regardless of other state.

use meridian_core::{Email, Phone, ServiceCenterId, ServiceTypeId, SlotId};

use super::ValidationErrors;

/// Service booking wizard steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BookingStep {
    /// Choose the kind of service.
    ServiceType,
    /// Identify the vehicle.
    Vehicle,
    /// Pick a city and service centre.
    Location,
    /// Pick a date and time slot.
    Schedule,
    /// Contact details.
    Contact,
}

impl BookingStep {
    /// 1-based step number for progress display.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::ServiceType => 1,
            Self::Vehicle => 2,
            Self::Location => 3,
            Self::Schedule => 4,
            Self::Contact => 5,
        }
    }

    const fn next(self) -> Self {
        match self {
            Self::ServiceType => Self::Vehicle,
            Self::Vehicle => Self::Location,
            Self::Location => Self::Schedule,
            Self::Schedule | Self::Contact => Self::Contact,
        }
    }

    const fn previous(self) -> Self {
        match self {
            Self::ServiceType | Self::Vehicle => Self::ServiceType,
            Self::Location => Self::Vehicle,
            Self::Schedule => Self::Location,
            Self::Contact => Self::Schedule,
        }
    }
}

/// One bookable time slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSlot {
    /// Slot identifier.
    pub id: SlotId,
    /// Display label (e.g., "10:00 - 11:00").
    pub label: String,
    /// Whether the slot can currently be booked.
    pub available: bool,
}

/// Raw booking form state, as typed/selected by the customer.
#[derive(Debug, Clone, Default)]
pub struct BookingForm {
    // Step 1: service type
    pub service_type: Option<ServiceTypeId>,
    // Step 2: vehicle
    pub vehicle_model: String,
    pub vehicle_year: String,
    pub registration_number: String,
    // Step 3: location
    pub city: String,
    pub service_center: Option<ServiceCenterId>,
    // Step 4: schedule
    pub date: String,
    pub slot: Option<SlotId>,
    // Step 5: contact
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Linear service booking wizard.
///
/// Constructed with the fixed slot list for the day; slot selection is
/// mediated by [`BookingWizard::select_slot`] so an unavailable slot can
/// never end up in the form.
#[derive(Debug, Clone)]
pub struct BookingWizard {
    step: BookingStep,
    slots: Vec<TimeSlot>,
    /// Accumulated form state across all steps.
    pub form: BookingForm,
}

impl BookingWizard {
    /// Start a fresh wizard with the given slot list.
    #[must_use]
    pub fn new(slots: Vec<TimeSlot>) -> Self {
        Self {
            step: BookingStep::ServiceType,
            slots,
            form: BookingForm::default(),
        }
    }

    /// The current step.
    #[must_use]
    pub const fn step(&self) -> BookingStep {
        self.step
    }

    /// The fixed slot list.
    #[must_use]
    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    /// Select a time slot.
    ///
    /// Returns `false` without touching the form when the slot is unknown
    /// or unavailable.
    pub fn select_slot(&mut self, id: &SlotId) -> bool {
        let selectable = self
            .slots
            .iter()
            .any(|slot| &slot.id == id && slot.available);
        if selectable {
            self.form.slot = Some(id.clone());
        }
        selectable
    }

    /// Validate the current step's fields without navigating.
    #[must_use]
    pub fn validate_current(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        match self.step {
            BookingStep::ServiceType => {
                if self.form.service_type.is_none() {
                    errors.insert("serviceType", "Select a service type");
                }
            }
            BookingStep::Vehicle => {
                if self.form.vehicle_model.trim().is_empty() {
                    errors.insert("model", "Vehicle model is required");
                }
                let year = self.form.vehicle_year.trim();
                if year.is_empty() {
                    errors.insert("year", "Vehicle year is required");
                } else if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
                    errors.insert("year", "Enter a 4-digit year");
                }
                if self.form.registration_number.trim().is_empty() {
                    errors.insert("registrationNumber", "Registration number is required");
                }
            }
            BookingStep::Location => {
                if self.form.city.trim().is_empty() {
                    errors.insert("city", "City is required");
                }
                if self.form.service_center.is_none() {
                    errors.insert("serviceCenter", "Select a service centre");
                }
            }
            BookingStep::Schedule => {
                if self.form.date.trim().is_empty() {
                    errors.insert("date", "Pick a date");
                }
                match &self.form.slot {
                    None => errors.insert("slot", "Pick a time slot"),
                    Some(id) => {
                        // The form can hold a slot that has since become
                        // unavailable (fresher slot list); re-check here.
                        let still_available = self
                            .slots
                            .iter()
                            .any(|slot| &slot.id == id && slot.available);
                        if !still_available {
                            errors.insert("slot", "Selected slot is no longer available");
                        }
                    }
                }
            }
            BookingStep::Contact => {
                if self.form.name.trim().is_empty() {
                    errors.insert("name", "Name is required");
                }
                if let Err(e) = Email::parse(&self.form.email) {
                    errors.insert("email", e.to_string());
                }
                if let Err(e) = Phone::parse(&self.form.phone) {
                    errors.insert("phone", e.to_string());
                }
            }
        }
        errors
    }

    /// Attempt a forward transition.
    ///
    /// # Errors
    ///
    /// Returns the field->message map when the current step's fields are
    /// invalid; the step is unchanged on failure.
    pub fn advance(&mut self) -> Result<BookingStep, ValidationErrors> {
        let errors = self.validate_current();
        if !errors.is_empty() {
            return Err(errors);
        }
        self.step = self.step.next();
        Ok(self.step)
    }

    /// Move back one step. Backward navigation is never validated.
    pub fn back(&mut self) -> BookingStep {
        self.step = self.step.previous();
        self.step
    }

    /// Jump back to an earlier step. Forward jumps are refused.
    pub fn back_to(&mut self, step: BookingStep) -> bool {
        if step <= self.step {
            self.step = step;
            true
        } else {
            false
        }
    }

    /// Update the slot list (e.g., after a date change) and drop a
    /// selected slot that is no longer available.
    pub fn set_slots(&mut self, slots: Vec<TimeSlot>) {
        self.slots = slots;
        if let Some(selected) = &self.form.slot {
            let still_available = self
                .slots
                .iter()
                .any(|slot| &slot.id == selected && slot.available);
            if !still_available {
                self.form.slot = None;
            }
        }
    }
}
