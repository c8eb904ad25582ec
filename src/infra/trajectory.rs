use std::collections::{BTreeMap, HashMap};

use crate::infra::{Action, AgentId, EpisodeObserver, EpisodeSummary, Position};
use crate::sim::{MultiAgentEnv, Observation};

/// State of one agent at the moment its action was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrajectoryEntry {
    pub position: Position,
    pub action: Action,
    pub done: bool,
}

/// Records the action-perception loop per agent and formats it as a table.
#[derive(Debug, Default)]
pub struct TrajectoryRecorder {
    history: BTreeMap<AgentId, Vec<TrajectoryEntry>>,
    summary: Option<EpisodeSummary>,
}

impl TrajectoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &BTreeMap<AgentId, Vec<TrajectoryEntry>> {
        &self.history
    }

    pub fn summary(&self) -> Option<&EpisodeSummary> {
        self.summary.as_ref()
    }

    pub fn len(&self) -> usize {
        self.history.values().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One row per iteration, one column per agent
    pub fn to_table(&self) -> String {
        let ids: Vec<AgentId> = self.history.keys().copied().collect();
        let rows = self.len();

        let mut columns: Vec<Vec<String>> = Vec::with_capacity(ids.len() + 1);
        columns.push(
            std::iter::once(String::new())
                .chain((0..rows).map(|i| i.to_string()))
                .collect(),
        );
        for id in &ids {
            let entries = &self.history[id];
            let mut column = vec![format!("A{}", id)];
            column.extend((0..rows).map(|i| {
                entries
                    .get(i)
                    .map(|e| format!("({}, {}, {})", e.position, e.action, e.done))
                    .unwrap_or_default()
            }));
            columns.push(column);
        }

        let widths: Vec<usize> = columns
            .iter()
            .map(|c| c.iter().map(String::len).max().unwrap_or(0))
            .collect();

        let mut out = String::new();
        for row in 0..=rows {
            let line: Vec<String> = columns
                .iter()
                .zip(&widths)
                .enumerate()
                .map(|(col, (column, width))| {
                    if col == 0 {
                        format!(" {:>width$} ", column[row], width = width)
                    } else {
                        format!(" {:<width$} ", column[row], width = width)
                    }
                })
                .collect();
            out.push_str(line.join("|").trim_end());
            out.push('\n');

            if row == 0 {
                let separator: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
                out.push_str(&separator.join("+"));
                out.push('\n');
            }
        }
        out
    }
}

impl EpisodeObserver for TrajectoryRecorder {
    fn on_reset(&mut self, _env: &MultiAgentEnv, observation: &Observation) {
        self.summary = None;
        self.history = observation
            .positions
            .keys()
            .map(|id| (*id, Vec::new()))
            .collect();
    }

    fn on_actions_selected(
        &mut self,
        _tick: usize,
        observation: &Observation,
        actions: &HashMap<AgentId, Action>,
    ) {
        for (id, position) in &observation.positions {
            let entry = TrajectoryEntry {
                position: *position,
                action: actions.get(id).copied().unwrap_or(Action::Stay),
                done: observation.dones.get(id).copied().unwrap_or(false),
            };
            self.history.entry(*id).or_default().push(entry);
        }
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) {
        self.summary = Some(*summary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(positions: &[(AgentId, Position, bool)]) -> Observation {
        Observation {
            positions: positions.iter().map(|(id, p, _)| (*id, *p)).collect(),
            dones: positions.iter().map(|(id, _, d)| (*id, *d)).collect(),
            infos: positions.iter().map(|(id, _, _)| (*id, Default::default())).collect(),
        }
    }

    #[test]
    fn test_records_and_formats_table() {
        let mut recorder = TrajectoryRecorder::new();
        let obs = observation(&[(0, Position::new(0, 0), false), (1, Position::new(2, 3), true)]);
        let actions = HashMap::from([(0, Action::Right)]);

        recorder.on_actions_selected(0, &obs, &actions);
        recorder.on_actions_selected(1, &obs, &actions);
        recorder.on_episode_end(&EpisodeSummary {
            steps: 2,
            all_done: false,
        });

        assert_eq!(recorder.len(), 2);
        assert_eq!(recorder.history()[&1][0].action, Action::Stay);
        assert_eq!(recorder.summary().map(|s| s.steps), Some(2));

        let table = recorder.to_table();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("A0") && lines[0].contains("A1"));
        assert!(lines[1].starts_with("---+"));
        assert!(lines[2].starts_with(" 0 | ((0, 0), RIGHT, false)"));
        assert!(lines[3].contains("((2, 3), STAY, true)"));
    }
}
