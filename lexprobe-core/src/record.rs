use crate::choice::{ChoiceSet, ResponseChoice};
use crate::measurement::Measurement;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Reaction time per choice, in choice-set order.
///
/// After a response at most one entry is measured; all others are
/// not applicable.
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionTimes {
    entries: Vec<(ResponseChoice, Measurement)>,
}

impl ReactionTimes {
    /// Every choice not applicable.
    pub fn unanswered(choices: &ChoiceSet) -> Self {
        Self {
            entries: choices
                .iter()
                .map(|c| (c.clone(), Measurement::NotApplicable))
                .collect(),
        }
    }

    /// `selected` gets `rt`, every other choice is not applicable.
    pub fn answered(choices: &ChoiceSet, selected: &ResponseChoice, rt: Measurement) -> Self {
        Self {
            entries: choices
                .iter()
                .map(|c| {
                    let m = if c == selected {
                        rt
                    } else {
                        Measurement::NotApplicable
                    };
                    (c.clone(), m)
                })
                .collect(),
        }
    }

    pub fn get(&self, label: &str) -> Option<Measurement> {
        self.entries
            .iter()
            .find(|(c, _)| c.label() == label)
            .map(|(_, m)| *m)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResponseChoice, Measurement)> {
        self.entries.iter().map(|(c, m)| (c, *m))
    }

    pub fn measured_count(&self) -> usize {
        self.entries.iter().filter(|(_, m)| m.is_measured()).count()
    }
}

impl Serialize for ReactionTimes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (choice, m) in &self.entries {
            map.serialize_entry(choice.label(), m)?;
        }
        map.end()
    }
}

/// Read-only view of one trial's measurements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeSnapshot {
    pub latency: Measurement,
    pub reaction_times: ReactionTimes,
    pub response_choice: Option<ResponseChoice>,
}

/// Per-trial identifiers supplied by the stimulus feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrialMetadata {
    pub stimulus: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub block: String,
    pub order: String,
    pub item: String,
    pub subject: String,
    pub audio_file: String,
}

/// Everything persisted for one finished trial.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialRecord {
    pub metadata: TrialMetadata,
    pub snapshot: ProbeSnapshot,
    pub audio_latency: Measurement,
}

impl TrialRecord {
    /// Column names in output order.
    pub fn columns(&self) -> Vec<String> {
        let mut cols: Vec<String> = [
            "Stimulus", "Type", "Block", "Order", "Item", "Subject", "AudioFile", "Choice",
            "Latency",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        cols.extend(
            self.snapshot
                .reaction_times
                .iter()
                .map(|(c, _)| format!("RT_{}", c.label())),
        );
        cols.push("AudioLatency".into());
        cols
    }
}

/// Flat map using the result-file column names (`RT_yes`, `AudioLatency`, ...).
impl Serialize for TrialRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let md = &self.metadata;
        let rts = &self.snapshot.reaction_times;
        let mut map = serializer.serialize_map(Some(10 + rts.entries.len()))?;
        map.serialize_entry("Stimulus", &md.stimulus)?;
        map.serialize_entry("Type", &md.kind)?;
        map.serialize_entry("Block", &md.block)?;
        map.serialize_entry("Order", &md.order)?;
        map.serialize_entry("Item", &md.item)?;
        map.serialize_entry("Subject", &md.subject)?;
        map.serialize_entry("AudioFile", &md.audio_file)?;
        match &self.snapshot.response_choice {
            Some(c) => map.serialize_entry("Choice", c.label())?,
            None => map.serialize_entry("Choice", crate::NOT_APPLICABLE)?,
        }
        map.serialize_entry("Latency", &self.snapshot.latency)?;
        for (choice, m) in rts.iter() {
            map.serialize_entry(&format!("RT_{}", choice.label()), &m)?;
        }
        map.serialize_entry("AudioLatency", &self.audio_latency)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::Interval;
    use serde_json::json;

    fn yes_record() -> TrialRecord {
        let choices = ChoiceSet::default();
        let yes = choices.get("yes").unwrap().clone();
        TrialRecord {
            metadata: TrialMetadata {
                stimulus: "水果".into(),
                kind: "word".into(),
                block: "1".into(),
                order: "3".into(),
                item: "12".into(),
                subject: "s01".into(),
                audio_file: "shuiguo.wav".into(),
            },
            snapshot: ProbeSnapshot {
                latency: Measurement::Measured(Interval::from_millis(120)),
                reaction_times: ReactionTimes::answered(
                    &choices,
                    &yes,
                    Measurement::Measured(Interval::from_millis(780)),
                ),
                response_choice: Some(yes),
            },
            audio_latency: Measurement::Measured(Interval::from_millis(35)),
        }
    }

    #[test]
    fn answered_fills_only_the_selected_choice() {
        let choices = ChoiceSet::default();
        let no = choices.get("no").unwrap();
        let rts = ReactionTimes::answered(
            &choices,
            no,
            Measurement::Measured(Interval::from_millis(10)),
        );
        assert_eq!(rts.measured_count(), 1);
        assert_eq!(rts.get("yes"), Some(Measurement::NotApplicable));
        assert_eq!(rts.get("maybe"), None);
    }

    #[test]
    fn record_uses_result_file_columns() {
        let value = serde_json::to_value(yes_record()).unwrap();
        assert_eq!(
            value,
            json!({
                "Stimulus": "水果",
                "Type": "word",
                "Block": "1",
                "Order": "3",
                "Item": "12",
                "Subject": "s01",
                "AudioFile": "shuiguo.wav",
                "Choice": "yes",
                "Latency": 120.0,
                "RT_no": "NA",
                "RT_yes": 780.0,
                "AudioLatency": 35.0,
            })
        );
    }

    #[test]
    fn columns_follow_choice_order() {
        let cols = yes_record().columns();
        assert_eq!(&cols[cols.len() - 3..], ["RT_no", "RT_yes", "AudioLatency"]);
    }

    #[test]
    fn unanswered_snapshot_serializes_na() {
        let choices = ChoiceSet::default();
        let snap = ProbeSnapshot {
            latency: Measurement::NotApplicable,
            reaction_times: ReactionTimes::unanswered(&choices),
            response_choice: None,
        };
        assert_eq!(
            serde_json::to_value(snap).unwrap(),
            json!({
                "latency": "NA",
                "reaction_times": {"no": "NA", "yes": "NA"},
                "response_choice": null,
            })
        );
    }
}
