use std::{fmt::{self, Display}, str::FromStr};

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Opaque bearer credential issued by the login endpoint.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CampaignId(String);

impl CampaignId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Display for CampaignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CampaignId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CampaignStatus {
    Scheduled,
    Sending,
    Sent,
    Failed,
}

impl CampaignStatus {
    pub const ALL: [Self; 4] = [Self::Scheduled, Self::Sending, Self::Sent, Self::Failed];

    /// A transient status changes server-side without user action and has to be polled.
    pub fn is_transient(self) -> bool {
        self == Self::Sending
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Sending => "sending",
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::Sending => "Sending",
            Self::Sent => "Sent",
            Self::Failed => "Failed",
        }
    }
}

impl FromStr for CampaignStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Ok(Self::Scheduled),
            "sending" => Ok(Self::Sending),
            "sent" => Ok(Self::Sent),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("unknown campaign status {s:?}")),
        }
    }
}

impl Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CampaignStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// Case-insensitive: older records carry "Scheduled", "SENT", ...
impl<'de> Deserialize<'de> for CampaignStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Wire shape of a campaign; the server sends `id`, `_id` or both.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "_id", default)]
    pub mongo_id: Option<String>,
    pub name: String,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub scheduled_time: Option<String>,
    pub status: CampaignStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CampaignRecord", into = "CampaignRecord")]
pub struct Campaign {
    pub id: CampaignId,
    pub name: String,
    pub subject: String,
    pub body: String,
    pub scheduled_time: Option<String>,
    pub status: CampaignStatus,
}

impl TryFrom<CampaignRecord> for Campaign {
    type Error = String;

    fn try_from(record: CampaignRecord) -> Result<Self, Self::Error> {
        let id = record
            .id
            .filter(|id| !id.is_empty())
            .or(record.mongo_id.filter(|id| !id.is_empty()))
            .ok_or_else(|| "campaign has neither `id` nor `_id`".to_owned())?;
        Ok(Self {
            id: CampaignId::new(id),
            name: record.name,
            subject: record.subject,
            body: record.body,
            scheduled_time: record.scheduled_time,
            status: record.status,
        })
    }
}

impl From<Campaign> for CampaignRecord {
    fn from(campaign: Campaign) -> Self {
        Self {
            id: Some(campaign.id.0),
            mongo_id: None,
            name: campaign.name,
            subject: campaign.subject,
            body: campaign.body,
            scheduled_time: campaign.scheduled_time,
            status: campaign.status,
        }
    }
}

impl Campaign {
    /// Overwrites the status and nothing else.
    pub fn apply_status(&mut self, status: CampaignStatus) {
        self.status = status;
    }

    pub fn scheduled_display(&self) -> String {
        format_scheduled_time(self.scheduled_time.as_deref())
    }
}

/// `YYYY-MM-DD HH:MM` for parseable timestamps, the raw text otherwise.
///
/// Timestamps with an offset are shown in the local time zone.
pub fn format_scheduled_time(raw: Option<&str>) -> String {
    let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
        return "—".to_owned();
    };
    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|time| time.with_timezone(&Local).naive_local())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        });
    match parsed {
        Some(time) => time.format("%Y-%m-%d %H:%M").to_string(),
        None => raw.to_owned(),
    }
}

/// Status endpoint payload, either `"sent"` or `{"status": "sent"}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StatusPayload {
    Bare(CampaignStatus),
    Wrapped { status: CampaignStatus },
}

impl StatusPayload {
    pub fn status(&self) -> CampaignStatus {
        match *self {
            Self::Bare(status) | Self::Wrapped { status } => status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCampaign {
    pub name: String,
    pub subject: String,
    pub body: String,
    /// `YYYY-MM-DD`
    pub scheduled_time: String,
    pub status: CampaignStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatedCampaign {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "_id", default)]
    mongo_id: Option<String>,
}

impl CreatedCampaign {
    pub fn id(&self) -> Option<CampaignId> {
        self.id
            .as_deref()
            .or(self.mongo_id.as_deref())
            .filter(|id| !id.is_empty())
            .map(CampaignId::from)
    }
}
