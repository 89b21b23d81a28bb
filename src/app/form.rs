//! Create/edit form for a single user.
//!
//! The form owns a draft of the four editable fields, seeded from an optional
//! existing record. Validation only runs on submit and reports every failing
//! field at once; editing a field clears that field's error alone.
//!
use regex::Regex;
use std::sync::LazyLock;

use crate::api::{User, UserPayload};

// Same shape as the web form: something@something.something
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern"));
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("phone pattern"));

/// Editable fields, in display and validation order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FormField {
    FirstName,
    LastName,
    Email,
    Phone,
}

impl FormField {
    pub const ALL: [FormField; 4] = [
        FormField::FirstName,
        FormField::LastName,
        FormField::Email,
        FormField::Phone,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::FirstName => "First Name",
            FormField::LastName => "Last Name",
            FormField::Email => "Email",
            FormField::Phone => "Phone",
        }
    }

    fn index(self) -> usize {
        match self {
            FormField::FirstName => 0,
            FormField::LastName => 1,
            FormField::Email => 2,
            FormField::Phone => 3,
        }
    }
}

/// What currently has keyboard focus inside the form.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FormFocus {
    Field(FormField),
    Cancel,
    Submit,
}

impl FormFocus {
    const ORDER: [FormFocus; 6] = [
        FormFocus::Field(FormField::FirstName),
        FormFocus::Field(FormField::LastName),
        FormFocus::Field(FormField::Email),
        FormFocus::Field(FormField::Phone),
        FormFocus::Cancel,
        FormFocus::Submit,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }
}

#[derive(Clone, Debug)]
pub struct UserForm {
    seed: Option<User>,
    values: [String; 4],
    errors: [Option<String>; 4],
    focus: FormFocus,
}

impl UserForm {
    /// A blank form (create mode) when `seed` is `None`, otherwise a draft of the seed (edit mode).
    pub fn new(seed: Option<User>) -> Self {
        let values = match &seed {
            Some(u) => [
                u.first_name.clone(),
                u.last_name.clone(),
                u.email.clone(),
                u.phone.clone(),
            ],
            None => Default::default(),
        };
        Self {
            seed,
            values,
            errors: Default::default(),
            focus: FormFocus::Field(FormField::FirstName),
        }
    }

    /// Point the form at another record. The draft is reset when the record identity changes.
    pub fn reseed(&mut self, seed: Option<User>) {
        let same = match (&self.seed, &seed) {
            (None, None) => true,
            (Some(a), Some(b)) => a.id == b.id,
            _ => false,
        };
        if !same {
            *self = Self::new(seed);
        }
    }

    pub fn seed(&self) -> Option<&User> {
        self.seed.as_ref()
    }

    pub fn is_edit(&self) -> bool {
        self.seed.is_some()
    }

    pub fn title(&self) -> &'static str {
        if self.is_edit() { "Edit User" } else { "Create New User" }
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_edit() { "Update" } else { "Create" }
    }

    pub fn value(&self, field: FormField) -> &str {
        &self.values[field.index()]
    }

    pub fn error(&self, field: FormField) -> Option<&str> {
        self.errors[field.index()].as_deref()
    }

    /// Current errors in field order.
    pub fn errors(&self) -> Vec<&str> {
        self.errors.iter().filter_map(|e| e.as_deref()).collect()
    }

    pub fn focus(&self) -> FormFocus {
        self.focus
    }

    pub fn focus_next(&mut self) {
        let pos = (self.focus.position() + 1) % FormFocus::ORDER.len();
        self.focus = FormFocus::ORDER[pos];
    }

    pub fn focus_prev(&mut self) {
        let len = FormFocus::ORDER.len();
        let pos = (self.focus.position() + len - 1) % len;
        self.focus = FormFocus::ORDER[pos];
    }

    pub fn set_value(&mut self, field: FormField, value: impl Into<String>) {
        self.values[field.index()] = value.into();
        self.errors[field.index()] = None;
    }

    /// Type a character into the focused field. No-op when a button has focus.
    pub fn insert_char(&mut self, c: char) {
        if let FormFocus::Field(field) = self.focus {
            let mut v = self.values[field.index()].clone();
            v.push(c);
            self.set_value(field, v);
        }
    }

    pub fn backspace(&mut self) {
        if let FormFocus::Field(field) = self.focus {
            let mut v = self.values[field.index()].clone();
            v.pop();
            self.set_value(field, v);
        }
    }

    /// Recompute every field's error from the current draft. Returns true when the draft is valid.
    pub fn validate(&mut self) -> bool {
        let [first, last, email, phone] = &self.values;
        self.errors = [
            required(first, "First name is required"),
            required(last, "Last name is required"),
            required(email, "Email is required").or_else(|| {
                (!EMAIL_RE.is_match(email)).then(|| "Email is invalid".to_string())
            }),
            required(phone, "Phone number is required").or_else(|| {
                (!PHONE_RE.is_match(phone)).then(|| "Phone number must be 10 digits".to_string())
            }),
        ];
        self.errors.iter().all(Option::is_none)
    }

    /// Validate and, when clean, hand out the draft as a payload.
    pub fn submit(&mut self) -> Option<UserPayload> {
        if !self.validate() {
            return None;
        }
        let [first_name, last_name, email, phone] = self.values.clone();
        Some(UserPayload {
            first_name,
            last_name,
            email,
            phone,
        })
    }
}

fn required(value: &str, msg: &str) -> Option<String> {
    value.trim().is_empty().then(|| msg.to_string())
}
