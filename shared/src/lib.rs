use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Number of rows shown per table page unless configured otherwise
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// MIME type attached to every CSV export
pub const CSV_MIME_TYPE: &str = "text/csv;charset=utf-8";

/// Role attached to a signed-in identity.
///
/// Tiers are nested: everything a `User` sees an `Accountant` sees too, and
/// an `Admin` sees everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum Role {
    Admin,
    Accountant,
    #[default]
    User,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Accountant, Role::User];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Accountant => "Accountant",
            Role::User => "User",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "accountant" => Ok(Role::Accountant),
            "user" => Ok(Role::User),
            other => Err(format!("Unknown role '{}'", other)),
        }
    }
}

/// Missing, empty or unrecognised roles all collapse to `Role::User`
fn deserialize_role<'de, D>(deserializer: D) -> Result<Role, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .and_then(|value| value.parse::<Role>().ok())
        .unwrap_or_default())
}

/// Identity of whoever is using the dashboard.
///
/// Persisted as JSON under a single key in the local key-value store, using
/// the same field names the web client always wrote (`isLoggedIn`, `name`,
/// `role`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Session {
    #[serde(rename = "isLoggedIn", alias = "isAuthenticated", default)]
    pub is_authenticated: bool,
    #[serde(default, alias = "username")]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_role")]
    pub role: Role,
}

impl Session {
    /// Session for a freshly authenticated identity
    pub fn signed_in(name: impl Into<String>, role: Role) -> Self {
        Self {
            is_authenticated: true,
            name: name.into(),
            role,
        }
    }

    /// Name shown in the sidebar greeting, falling back to "User"
    pub fn display_name(&self) -> &str {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            "User"
        } else {
            trimmed
        }
    }
}

/// A single navigation link in the sidebar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavEntry {
    pub label: String,
    /// Route path handed to the router untouched
    pub path: String,
    pub visible_for: BTreeSet<Role>,
}

/// Scalar value stored in a record field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// True for empty or whitespace-only text
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::Number(_) | FieldValue::Bool(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(value) => write!(f, "{}", value),
            FieldValue::Number(value) => write!(f, "{}", value),
            FieldValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

/// Named field values of a record, ordered by field name
pub type Fields = BTreeMap<String, FieldValue>;

/// A document from a collection (a trip or an expense).
///
/// The id is assigned by the store on insert and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(flatten)]
    pub fields: Fields,
}

impl Record {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Display text of a field, empty when the field is missing
    pub fn text(&self, key: &str) -> String {
        self.fields
            .get(key)
            .map(|value| value.to_string())
            .unwrap_or_default()
    }
}

/// Date range typed into the search bar.
///
/// Values are kept exactly as entered; normalization happens when the query
/// is built.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

impl SearchCriteria {
    pub fn between(from_date: impl Into<String>, to_date: impl Into<String>) -> Self {
        Self {
            from_date: Some(from_date.into()),
            to_date: Some(to_date.into()),
        }
    }

    pub fn from_bounds(from_date: Option<String>, to_date: Option<String>) -> Self {
        Self { from_date, to_date }
    }
}

/// Visible slice of a loaded record set.
///
/// `page_size` is at least 1 and `current_page` is 1-based. Both hold for
/// values built through `new` and for deserialized ones, which are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PageWindowFields")]
pub struct PageWindow {
    page_size: usize,
    current_page: usize,
}

#[derive(Deserialize)]
struct PageWindowFields {
    page_size: usize,
    current_page: usize,
}

impl TryFrom<PageWindowFields> for PageWindow {
    type Error = String;

    fn try_from(fields: PageWindowFields) -> Result<Self, Self::Error> {
        if fields.page_size == 0 {
            return Err("page_size must be at least 1".to_string());
        }
        if fields.current_page == 0 {
            return Err("current_page is 1-based".to_string());
        }
        Ok(Self {
            page_size: fields.page_size,
            current_page: fields.current_page,
        })
    }
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl PageWindow {
    /// A zero page size is bumped to 1
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page: 1,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// 1-based
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// `ceil(total / page_size)`, zero for an empty set
    pub fn total_pages(&self, total_records: usize) -> usize {
        total_records.div_ceil(self.page_size.max(1))
    }

    /// Pull `current_page` back into `[1, max(total_pages, 1)]`
    pub fn clamp(&mut self, total_records: usize) {
        let last_page = self.total_pages(total_records).max(1);
        self.current_page = self.current_page.clamp(1, last_page);
    }

    /// Back to page 1
    pub fn rewind(&mut self) {
        self.current_page = 1;
    }

    /// Index range of the current page within the loaded set
    pub fn slice_range(&self, total_records: usize) -> Range<usize> {
        let page_size = self.page_size.max(1);
        let start = self
            .current_page
            .saturating_sub(1)
            .saturating_mul(page_size)
            .min(total_records);
        let end = start.saturating_add(page_size).min(total_records);
        start..end
    }

    /// Advance one page; returns false (and does nothing) on the last page
    pub fn next(&mut self, total_records: usize) -> bool {
        if self.current_page < self.total_pages(total_records) {
            self.current_page += 1;
            true
        } else {
            false
        }
    }

    /// Go back one page; returns false (and does nothing) on the first page
    pub fn previous(&mut self) -> bool {
        if self.current_page > 1 {
            self.current_page -= 1;
            true
        } else {
            false
        }
    }

    /// Page holding the record at `index`
    pub fn page_of(&self, index: usize) -> usize {
        index / self.page_size.max(1) + 1
    }

    /// Move to the page holding the record at `index`
    pub fn show_index(&mut self, index: usize) {
        self.current_page = self.page_of(index);
    }
}

/// One export column: header label and the record field it reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column<'a> {
    pub label: &'a str,
    pub key: &'a str,
}

impl<'a> Column<'a> {
    pub const fn new(label: &'a str, key: &'a str) -> Self {
        Self { label, key }
    }
}

const TRIP_COLUMNS: &[Column<'static>] = &[
    Column::new("Trip Date", "tripDate"),
    Column::new("Truck Plate Number", "truckPlateNumber"),
    Column::new("Truck Driver Name", "truckDriverName"),
    Column::new("Truck Category", "truckCategory"),
    Column::new("Delivery Note", "deliveryNote"),
    Column::new("Customer Name", "customerName"),
    Column::new("C/O", "cO"),
    Column::new("First Loading", "firstLoading"),
    Column::new("First Offloading", "firstOffloading"),
    Column::new("Second Loading", "secondLoading"),
    Column::new("Second Offloading", "secondOffloading"),
    Column::new("Customer Rate", "customerRate"),
    Column::new("Customer Waiting Charges", "customerWaitingCharges"),
    Column::new("Amount Received", "amountReceived"),
    Column::new("Amount Balance", "amountBalance"),
    Column::new("Driver Rate", "driverRate"),
    Column::new("Driver Waiting Charges", "driverWaitingCharges"),
    Column::new("Amount Paid", "amountPaid"),
    Column::new("Transaction Amount Balance", "transactionAmountBalance"),
    Column::new("Invoice No", "invoiceNo"),
    Column::new("Invoice Date", "invoiceDate"),
    Column::new("Remarks", "remarks"),
    Column::new("Created Date", "created"),
];

const EXPENSE_COLUMNS: &[Column<'static>] = &[
    Column::new("Title", "title"),
    Column::new("Amount", "amount"),
    Column::new("Date", "date"),
];

/// The record types the dashboard manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Trip,
    Expense,
}

impl EntityKind {
    /// Name of the backing collection in the document store
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Trip => "trips",
            EntityKind::Expense => "expenses",
        }
    }

    /// Field the date-range search filters on
    pub fn date_field(&self) -> &'static str {
        match self {
            EntityKind::Trip => "tripDate",
            EntityKind::Expense => "date",
        }
    }

    /// Fields that must be non-blank before a draft can be saved
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Trip => &["tripDate", "truckPlateNumber", "truckDriverName", "customerName"],
            EntityKind::Expense => &["title", "amount", "date"],
        }
    }

    /// Field stamped with the creation date when a new record is saved
    pub fn created_field(&self) -> Option<&'static str> {
        match self {
            EntityKind::Trip => Some("created"),
            EntityKind::Expense => None,
        }
    }

    /// Column mapping used by the table and the CSV export
    pub fn columns(&self) -> &'static [Column<'static>] {
        match self {
            EntityKind::Trip => TRIP_COLUMNS,
            EntityKind::Expense => EXPENSE_COLUMNS,
        }
    }

    /// Keys a blank draft is seeded with
    pub fn form_fields(&self) -> Vec<&'static str> {
        let created = self.created_field();
        self.columns()
            .iter()
            .map(|column| column.key)
            .filter(|key| Some(*key) != created)
            .collect()
    }

    pub fn export_filename(&self) -> &'static str {
        match self {
            EntityKind::Trip => "trip_data.csv",
            EntityKind::Expense => "expense_data.csv",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            EntityKind::Trip => "Trip",
            EntityKind::Expense => "Expense",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trip" | "trips" => Ok(EntityKind::Trip),
            "expense" | "expenses" => Ok(EntityKind::Expense),
            other => Err(format!("Unknown record kind '{}' (expected trips or expenses)", other)),
        }
    }
}

/// A ready-to-download export file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportPayload {
    pub filename: String,
    pub mime_type: String,
    pub content: String,
    pub record_count: usize,
}
