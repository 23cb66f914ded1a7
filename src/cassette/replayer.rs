//! Replays recorded interactions from a cassette.

use std::collections::HashMap;

use super::format::{Cassette, Interaction};

/// Interactions for one port/method pair and how many have been served.
#[derive(Debug, Default)]
struct Queue {
    interactions: Vec<Interaction>,
    cursor: usize,
}

/// Serves interactions from a loaded cassette, in recorded order, per
/// port/method pair.
#[derive(Debug)]
pub struct CassetteReplayer {
    queues: HashMap<(String, String), Queue>,
}

impl CassetteReplayer {
    /// Index a loaded cassette by port and method.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut queues: HashMap<(String, String), Queue> = HashMap::new();
        for interaction in &cassette.interactions {
            queues
                .entry((interaction.port.clone(), interaction.method.clone()))
                .or_default()
                .interactions
                .push(interaction.clone());
        }
        Self { queues }
    }

    /// Return the next interaction for the given port and method.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette has no (more) interactions for the
    /// given port/method pair.
    pub fn next_interaction(&mut self, port: &str, method: &str) -> Result<&Interaction, String> {
        let key = (port.to_string(), method.to_string());
        if !self.queues.contains_key(&key) {
            let mut available: Vec<String> =
                self.queues.keys().map(|(p, m)| format!("{p}::{m}")).collect();
            available.sort();
            return Err(format!(
                "Cassette exhausted: no interactions recorded for {port}::{method}. \
                 Available: [{}]",
                available.join(", ")
            ));
        }

        let queue = self.queues.get_mut(&key).ok_or("cassette queue vanished")?;
        let Some(interaction) = queue.interactions.get(queue.cursor) else {
            return Err(format!(
                "Cassette exhausted: all {} interactions for {port}::{method} have been consumed",
                queue.interactions.len()
            ));
        };
        queue.cursor += 1;
        Ok(interaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn interaction(seq: u64, method: &str) -> Interaction {
        Interaction {
            seq,
            port: "diffusion_pipeline".into(),
            method: method.into(),
            input: json!({}),
            output: json!({"Ok": null}),
        }
    }

    fn make_cassette(interactions: Vec<Interaction>) -> Cassette {
        Cassette { name: "test".into(), recorded_at: Utc::now(), commit: "abc".into(), interactions }
    }

    #[test]
    fn replay_in_order_per_method() {
        let cassette = make_cassette(vec![
            interaction(0, "probe"),
            interaction(1, "generate"),
            interaction(2, "generate"),
        ]);
        let mut replayer = CassetteReplayer::new(&cassette);

        assert_eq!(replayer.next_interaction("diffusion_pipeline", "generate").unwrap().seq, 1);
        assert_eq!(replayer.next_interaction("diffusion_pipeline", "probe").unwrap().seq, 0);
        assert_eq!(replayer.next_interaction("diffusion_pipeline", "generate").unwrap().seq, 2);
    }

    #[test]
    fn exhausted_method_errors() {
        let mut replayer = CassetteReplayer::new(&make_cassette(vec![interaction(0, "load")]));
        assert!(replayer.next_interaction("diffusion_pipeline", "load").is_ok());

        let err = replayer.next_interaction("diffusion_pipeline", "load").unwrap_err();
        assert!(err.contains("have been consumed"), "{err}");
    }

    #[test]
    fn unknown_method_lists_available() {
        let mut replayer = CassetteReplayer::new(&make_cassette(vec![interaction(0, "probe")]));
        let err = replayer.next_interaction("diffusion_pipeline", "to_device").unwrap_err();
        assert!(err.contains("no interactions recorded"), "{err}");
        assert!(err.contains("diffusion_pipeline::probe"), "{err}");
    }
}
