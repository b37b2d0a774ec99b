/// A value with optional type labels (`work`, `cell`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Labeled<T> {
    /// Lowercased type labels in declaration order
    pub labels: Vec<String>,
    /// The value itself
    pub value: T,
}

impl<T> Labeled<T> {
    /// Value with labels
    pub fn with_labels(value: T, labels: Vec<String>) -> Self {
        Self { labels, value }
    }

    /// True when `label` was declared (case-insensitive)
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l.eq_ignore_ascii_case(label))
    }
}

/// Components of the `N` property
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StructuredName {
    /// Family (last) name
    pub family: String,
    /// Given (first) name
    pub given: String,
    /// Additional (middle) names
    pub additional: String,
    /// Honorific prefix
    pub prefix: String,
    /// Honorific suffix
    pub suffix: String,
}

impl StructuredName {
    /// True when every component is blank
    pub fn is_empty(&self) -> bool {
        [
            &self.family,
            &self.given,
            &self.additional,
            &self.prefix,
            &self.suffix,
        ]
        .iter()
        .all(|part| part.trim().is_empty())
    }

    /// Components joined in reading order
    pub fn display(&self) -> String {
        [
            &self.prefix,
            &self.given,
            &self.additional,
            &self.family,
            &self.suffix,
        ]
        .iter()
        .filter(|part| !part.trim().is_empty())
        .map(|part| part.trim())
        .collect::<Vec<_>>()
        .join(" ")
    }
}

/// Components of the `ADR` property
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PostalAddress {
    /// Post office box
    pub po_box: String,
    /// Extended address (apartment, suite)
    pub extended: String,
    /// Street address
    pub street: String,
    /// City
    pub locality: String,
    /// State or province
    pub region: String,
    /// Postal code
    pub postal_code: String,
    /// Country
    pub country: String,
}

/// Editable fields of a contact, used for per-field editor actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    /// Formatted or structured name
    Name,
    /// Organization, department or title
    Organization,
    /// A phone number
    Phone,
    /// An email address
    Email,
    /// A postal address
    Address,
    /// A URL
    Url,
    /// Free-form note
    Note,
    /// Birthday
    Birthday,
}

/// Structured contact parsed from a vCard payload
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContactRecord {
    /// `FN`
    pub formatted_name: Option<String>,
    /// `N`
    pub name: Option<StructuredName>,
    /// First `ORG` component
    pub organization: Option<String>,
    /// Remaining `ORG` components
    pub department: Option<String>,
    /// `TITLE`
    pub job_title: Option<String>,
    /// `BDAY`, as written
    pub birthday: Option<String>,
    /// `NOTE`
    pub note: Option<String>,
    /// `TEL`
    pub phones: Vec<Labeled<String>>,
    /// `EMAIL`
    pub emails: Vec<Labeled<String>>,
    /// `URL`
    pub urls: Vec<Labeled<String>>,
    /// `ADR`
    pub addresses: Vec<Labeled<PostalAddress>>,
}

impl ContactRecord {
    /// Best human-readable name: `FN`, then `N`, then organization
    pub fn display_name(&self) -> Option<String> {
        if let Some(name) = self.formatted_name.as_ref().filter(|n| !n.trim().is_empty()) {
            return Some(name.trim().to_string());
        }
        if let Some(name) = self.name.as_ref().filter(|n| !n.is_empty()) {
            return Some(name.display());
        }
        self.organization.clone()
    }

    /// True when no property was parsed at all
    pub fn is_empty(&self) -> bool {
        self.display_name().is_none()
            && self.department.is_none()
            && self.job_title.is_none()
            && self.birthday.is_none()
            && self.note.is_none()
            && self.phones.is_empty()
            && self.emails.is_empty()
            && self.urls.is_empty()
            && self.addresses.is_empty()
    }
}
