use std::collections::BTreeMap;
use std::fmt;

/// Digits in a company registration number (CNPJ).
pub const IDENTIFIER_LEN: usize = 14;

pub const TRIGGER_LABEL: &str = "Lookup CNPJ";
pub const SEARCHING_LABEL: &str = "Searching...";

pub const INVALID_IDENTIFIER_MSG: &str = "invalid identifier, must be 14 digits";
pub const LOOKUP_SUCCESS_MSG: &str = "Company data filled in successfully";
pub const LOOKUP_FAILED_MSG: &str = "Company lookup failed";

/// Keeps only ASCII digits, in input order.
pub fn clean_identifier(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidIdentifier {
    pub digits: usize,
}

impl fmt::Display for InvalidIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{INVALID_IDENTIFIER_MSG} (got {})", self.digits)
    }
}

impl std::error::Error for InvalidIdentifier {}

/// A cleaned, 14-digit company registration number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cnpj(String);

impl Cnpj {
    pub fn parse(raw: &str) -> Result<Self, InvalidIdentifier> {
        let digits = clean_identifier(raw);
        if digits.len() == IDENTIFIER_LEN {
            Ok(Self(digits))
        } else {
            Err(InvalidIdentifier {
                digits: digits.len(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cnpj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registration form fields the lookup can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormField {
    Name,
    City,
    Region,
    PostalCode,
    Street,
    Number,
    Complement,
    District,
}

impl FormField {
    pub const ALL: [FormField; 8] = [
        FormField::Name,
        FormField::City,
        FormField::Region,
        FormField::PostalCode,
        FormField::Street,
        FormField::Number,
        FormField::Complement,
        FormField::District,
    ];

    /// Form element id of the field on the registration page.
    pub fn element_id(self) -> &'static str {
        match self {
            FormField::Name => "id_nome",
            FormField::City => "id_cidade",
            FormField::Region => "id_uf",
            FormField::PostalCode => "id_cep",
            FormField::Street => "id_logradouro",
            FormField::Number => "id_numero",
            FormField::Complement => "id_complemento",
            FormField::District => "id_bairro",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::City => "city",
            FormField::Region => "region",
            FormField::PostalCode => "postal code",
            FormField::Street => "street",
            FormField::Number => "number",
            FormField::Complement => "complement",
            FormField::District => "district",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.element_id() == raw || field.label().replace(' ', "_") == raw)
    }
}

/// Company record returned by the lookup. Empty strings mean "not provided".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompanyData {
    pub trade_name: String,
    pub legal_name: String,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub street: String,
    pub number: String,
    pub complement: String,
    pub district: String,
}

impl CompanyData {
    pub fn value_for(&self, field: FormField) -> &str {
        match field {
            FormField::Name if !self.trade_name.is_empty() => &self.trade_name,
            FormField::Name => &self.legal_name,
            FormField::City => &self.city,
            FormField::Region => &self.region,
            FormField::PostalCode => &self.postal_code,
            FormField::Street => &self.street,
            FormField::Number => &self.number,
            FormField::Complement => &self.complement,
            FormField::District => &self.district,
        }
    }
}

/// The registration form: only fields present here can be filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupForm {
    fields: BTreeMap<FormField, String>,
}

impl Default for LookupForm {
    fn default() -> Self {
        Self::with_fields(FormField::ALL)
    }
}

impl LookupForm {
    pub fn with_fields(fields: impl IntoIterator<Item = FormField>) -> Self {
        Self {
            fields: fields.into_iter().map(|f| (f, String::new())).collect(),
        }
    }

    pub fn value(&self, field: FormField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.fields.iter().map(|(f, v)| (*f, v.as_str()))
    }

    /// Edits a field value; returns false if the form has no such field.
    pub fn set(&mut self, field: FormField, value: impl Into<String>) -> bool {
        match self.fields.get_mut(&field) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    /// Overwrites every present field for which `data` has a non-empty value.
    pub fn fill(&mut self, data: &CompanyData) -> Vec<FormField> {
        let mut filled = Vec::new();
        for (field, slot) in self.fields.iter_mut() {
            let value = data.value_for(*field);
            if !value.is_empty() {
                *slot = value.to_string();
                filled.push(*field);
            }
        }
        filled
    }
}

/// Why a lookup did not produce data. `message` is the server's text, if any.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LookupFailure {
    pub message: Option<String>,
}

impl LookupFailure {
    pub fn display_text(&self) -> &str {
        match self.message.as_deref() {
            Some(text) if !text.trim().is_empty() => text,
            _ => LOOKUP_FAILED_MSG,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LookupState {
    pub(crate) input: String,
    pub(crate) form: LookupForm,
    pub(crate) in_flight: bool,
}

impl LookupState {
    pub fn with_form(form: LookupForm) -> Self {
        Self {
            form,
            ..Self::default()
        }
    }

    pub fn form(&self) -> &LookupForm {
        &self.form
    }

    pub fn trigger_label(&self) -> &'static str {
        if self.in_flight {
            SEARCHING_LABEL
        } else {
            TRIGGER_LABEL
        }
    }
}
