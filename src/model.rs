use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Flat task record as persisted in the store document.
///
/// `position` orders a task among its siblings (tasks sharing the same
/// `parent_id`); the store renumbers every sibling group to `0..k-1` on load.
/// Child links are never persisted, they are derived from `parent_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub position: usize,
    #[serde(with = "epoch_seconds")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub due: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_recurrence")]
    pub recurrence: Option<u32>,
}

impl Task {
    /// Fresh task with a new id and the current timestamp. Title is stored
    /// as given; callers validate and trim first.
    pub fn new(title: String, parent_id: Option<String>, position: usize) -> Self {
        Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            title,
            parent_id,
            position,
            created_at: Utc::now(),
            due: None,
            recurrence: None,
        }
    }
}

/// Tree view node: a task plus its ordered children, rebuilt from the flat
/// record set on every listing. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskNode {
    pub id: String,
    pub title: String,
    pub parent_id: Option<String>,
    pub position: usize,
    #[serde(with = "epoch_seconds")]
    pub created_at: DateTime<Utc>,
    pub due: Option<NaiveDate>,
    pub recurrence: Option<u32>,
    #[serde(default)]
    pub children: Vec<TaskNode>,
}

/// Outcome of completing a task: recurring tasks are rescheduled in place,
/// one-shot tasks are removed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "outcome", content = "task", rename_all = "snake_case")]
pub enum Completion {
    Rescheduled(Task),
    Done(Task),
}

impl Completion {
    pub fn task(&self) -> &Task {
        match self {
            Self::Rescheduled(task) | Self::Done(task) => task,
        }
    }
}

/// Legacy stores recorded recurrence as strings ("daily", "everyday", "3").
/// Known aliases map to a day count; unknown tokens mean no recurrence.
pub(crate) fn recurrence_from_alias(raw: &str) -> Option<u32> {
    const ALIASES: &[(&str, u32)] = &[
        ("daily", 1),
        ("day", 1),
        ("everyday", 1),
        ("every day", 1),
    ];
    let token = raw.trim().to_ascii_lowercase();
    if let Some(&(_, days)) = ALIASES.iter().find(|(name, _)| *name == token) {
        return Some(days);
    }
    token.parse::<u32>().ok().filter(|&days| days > 0)
}

fn deserialize_recurrence<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Days(i64),
        Alias(String),
    }

    let raw = Option::<Raw>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match value {
        Raw::Days(days) if days > 0 => Some(days as u32),
        Raw::Days(_) => None,
        Raw::Alias(alias) => recurrence_from_alias(&alias),
    }))
}

/// Creation timestamps persist as epoch seconds (a bare JSON number), the
/// shape the pre-rewrite store wrote. Fractional values are accepted.
mod epoch_seconds {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let seconds =
            value.timestamp() as f64 + f64::from(value.timestamp_subsec_micros()) / 1_000_000.0;
        serializer.serialize_f64(seconds)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds = f64::deserialize(deserializer)?;
        let whole = seconds.floor();
        let nanos = ((seconds - whole) * 1e9).round() as u32;
        DateTime::from_timestamp(whole as i64, nanos.min(999_999_999))
            .ok_or_else(|| serde::de::Error::custom(format!("timestamp out of range: {seconds}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn task_round_trips_json() {
        let mut task = Task::new("Water the plants".into(), None, 0);
        task.due = Some(date(2025, 4, 20));
        task.recurrence = Some(7);

        let json = serde_json::to_string(&task).unwrap();
        let parsed: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(task.id, parsed.id);
        assert_eq!(parsed.due, Some(date(2025, 4, 20)));
        assert_eq!(parsed.recurrence, Some(7));
        // Sub-second precision survives to the microsecond.
        assert_eq!(
            task.created_at.timestamp_micros(),
            parsed.created_at.timestamp_micros()
        );
    }

    #[test]
    fn fresh_ids_are_unique_hex() {
        let a = Task::new("a".into(), None, 0);
        let b = Task::new("b".into(), None, 0);
        assert_ne!(a.id, b.id);
        assert_eq!(a.id.len(), 32);
        assert!(a.id.bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn record_keys_always_present() {
        let task = Task::new("Minimal".into(), None, 0);
        let json = serde_json::to_string(&task).unwrap();
        for key in ["parent_id", "position", "created_at", "due", "recurrence"] {
            assert!(json.contains(key), "missing key {key} in {json}");
        }
    }

    #[test]
    fn loads_legacy_record_shapes() {
        // Float timestamp and string recurrence, as written by the old store.
        let json = r#"{
            "id": "abc123",
            "title": "Backup",
            "parent_id": null,
            "position": 0,
            "created_at": 1745100000.25,
            "due": "2025-04-20",
            "recurrence": "daily"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.recurrence, Some(1));
        assert_eq!(task.due, Some(date(2025, 4, 20)));
        assert_eq!(task.created_at.timestamp(), 1_745_100_000);
    }

    #[test]
    fn recurrence_aliases_normalize_to_day_counts() {
        assert_eq!(recurrence_from_alias("daily"), Some(1));
        assert_eq!(recurrence_from_alias("Every Day"), Some(1));
        assert_eq!(recurrence_from_alias("everyday"), Some(1));
        assert_eq!(recurrence_from_alias("14"), Some(14));
        assert_eq!(recurrence_from_alias("0"), None);
        assert_eq!(recurrence_from_alias("fortnight"), None);
    }

    #[test]
    fn unparseable_recurrence_drops_to_none() {
        let json = r#"{
            "id": "abc123",
            "title": "Backup",
            "position": 0,
            "created_at": 1745100000,
            "recurrence": "sometimes"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.recurrence, None);
    }

    #[test]
    fn nonpositive_recurrence_drops_to_none() {
        for raw in ["0", "-3"] {
            let json = format!(
                r#"{{"id": "x", "title": "t", "position": 0, "created_at": 0, "recurrence": {raw}}}"#
            );
            let task: Task = serde_json::from_str(&json).unwrap();
            assert_eq!(task.recurrence, None, "recurrence {raw} should drop");
        }
    }
}
