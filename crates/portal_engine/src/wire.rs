//! JSON payloads of the portal API.
//!
//! Decimal columns arrive either as JSON numbers or as decimal strings
//! depending on the endpoint, so numeric fields are parsed leniently.

use chrono::{DateTime, FixedOffset};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ResultsPage<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JobRecord {
    #[serde(deserialize_with = "text")]
    pub id: String,
    #[serde(default, deserialize_with = "text")]
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "text")]
    pub job_type: String,
    #[serde(default, deserialize_with = "text")]
    pub status: String,
    #[serde(default, deserialize_with = "number")]
    pub progress: f64,
    #[serde(default)]
    pub started_at: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogRecord {
    pub ts: DateTime<FixedOffset>,
    #[serde(default, deserialize_with = "text")]
    pub level: String,
    #[serde(default, deserialize_with = "text")]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct RunJobRequest<'a> {
    #[serde(rename = "type")]
    pub job_type: &'a str,
}

/// Acknowledgement of a run request; the job keeps running server-side.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RunAck {
    #[serde(default, deserialize_with = "optional_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ItemsReport {
    #[serde(rename = "itens", default)]
    pub items: Vec<ItemRecord>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ItemRecord {
    #[serde(rename = "produto__sku", default, deserialize_with = "text")]
    pub sku: String,
    #[serde(rename = "produto__descricao", default, deserialize_with = "text")]
    pub description: String,
    #[serde(rename = "qtd_total", default, deserialize_with = "number")]
    pub quantity: f64,
    #[serde(rename = "valor_total", default, deserialize_with = "number")]
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SalesSummary {
    #[serde(rename = "totais", default)]
    pub totals: SummaryTotals,
    #[serde(rename = "por_cliente", default)]
    pub customers: Vec<CustomerRecord>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SummaryTotals {
    #[serde(rename = "qtd_pedidos", default, deserialize_with = "number")]
    pub orders: f64,
    #[serde(rename = "total_vendido", default, deserialize_with = "number")]
    pub total_sold: f64,
    #[serde(rename = "ticket_medio", default, deserialize_with = "number")]
    pub average_ticket: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CustomerRecord {
    #[serde(rename = "cliente__nome", default, deserialize_with = "text")]
    pub customer: String,
    #[serde(rename = "pedidos", default, deserialize_with = "number")]
    pub orders: f64,
    #[serde(default, deserialize_with = "number")]
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct CompanyRecord {
    #[serde(default, deserialize_with = "text")]
    pub nome_fantasia: String,
    #[serde(default, deserialize_with = "text")]
    pub razao_social: String,
    #[serde(default, deserialize_with = "text")]
    pub municipio: String,
    #[serde(default, deserialize_with = "text")]
    pub uf: String,
    #[serde(default, deserialize_with = "text")]
    pub cep: String,
    #[serde(default, deserialize_with = "text")]
    pub logradouro: String,
    #[serde(default, deserialize_with = "text")]
    pub numero: String,
    #[serde(default, deserialize_with = "text")]
    pub complemento: String,
    #[serde(default, deserialize_with = "text")]
    pub bairro: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct LookupResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default, deserialize_with = "optional_text")]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub detail: Option<String>,
    #[serde(default)]
    pub data: Option<CompanyRecord>,
}

impl LookupResponse {
    /// Server-provided failure text: `error` first, then `detail`.
    pub fn failure_message(self) -> Option<String> {
        self.error
            .filter(|text| !text.is_empty())
            .or(self.detail.filter(|text| !text.is_empty()))
    }
}

fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| D::Error::custom(format!("number {n} out of range"))),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(0.0),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|err| D::Error::custom(format!("invalid decimal {s:?}: {err}"))),
        Some(other) => Err(D::Error::custom(format!("expected a number, got {other}"))),
    }
}

fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(D::Error::custom(format!("expected text, got {other}"))),
    }
}

fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    optional_text(deserializer).map(Option::unwrap_or_default)
}
