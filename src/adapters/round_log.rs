use crate::domain::model::RoundRecord;
use crate::domain::ports::RoundSink;
use crate::utils::error::Result;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// 每回合寫入一行 JSON
pub struct JsonLinesRoundLog {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl JsonLinesRoundLog {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RoundSink for JsonLinesRoundLog {
    fn record(&mut self, round: &RoundRecord) -> Result<()> {
        serde_json::to_writer(&mut self.writer, round)?;
        self.writer.write_all(b"\n")?;
        // Flush per round so completed rounds survive a later fatal error.
        self.writer.flush()?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryRoundLog {
    pub rounds: Vec<RoundRecord>,
}

impl MemoryRoundLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RoundSink for MemoryRoundLog {
    fn record(&mut self, round: &RoundRecord) -> Result<()> {
        self.rounds.push(round.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ScoreLine;
    use tempfile::TempDir;

    fn sample_round(round: usize) -> RoundRecord {
        RoundRecord {
            round,
            storyteller: "AI_Player_1".to_string(),
            clue: "a door to nowhere".to_string(),
            storyteller_card: "cards/07.jpg".to_string(),
            plays: vec![],
            pool: vec!["cards/07.jpg".to_string()],
            votes: vec![],
            storyteller_votes: 0,
            deltas: vec![ScoreLine {
                player: "AI_Player_1".to_string(),
                points: 0,
            }],
            totals: vec![ScoreLine {
                player: "AI_Player_1".to_string(),
                points: 0,
            }],
        }
    }

    #[test]
    fn test_json_lines_one_record_per_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs").join("rounds.jsonl");

        let mut log = JsonLinesRoundLog::create(&path).unwrap();
        log.record(&sample_round(1)).unwrap();
        log.record(&sample_round(2)).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let rounds: Vec<RoundRecord> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(rounds.len(), 2);
        assert_eq!(rounds[1].round, 2);
        assert_eq!(rounds[0].clue, "a door to nowhere");
    }
}
