//! Cross-process milestone channel backed by a JSON-lines spool file.
//!
//! Emitters append one JSON object per line. A subscriber remembers the file
//! length at subscribe time and polls for lines appended after it, so it never
//! replays older milestones. The whole history stays on disk and can still be
//! queried with [`SpoolChannel::has_milestone`], which is how a process started
//! later learns that a component finished in an earlier run.

use std::collections::VecDeque;
use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tracing::{debug, warn};

use super::{GateError, GateResult, Milestone, MilestoneChannel, MilestoneStream};
use crate::component::ComponentKey;
use crate::manager::BoxFuture;

/// File name of the spool inside the spool directory.
pub const SPOOL_FILE: &str = "milestones.jsonl";

/// Milestone channel shared through a file in a common directory.
#[derive(Debug, Clone)]
pub struct SpoolChannel {
    path: PathBuf,
    poll_interval: Duration,
}

impl SpoolChannel {
    pub fn new(dir: impl AsRef<Path>, poll_interval: Duration) -> Self {
        Self {
            path: dir.as_ref().join(SPOOL_FILE),
            poll_interval,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether any milestone for `component` was ever written to the spool.
    pub async fn has_milestone(&self, component: &str) -> GateResult<bool> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(source) => return Err(self.io_error(source)),
        };

        Ok(history_contains(&contents, component))
    }

    async fn append(&self, milestone: &Milestone) -> GateResult<()> {
        let mut line = serde_json::to_string(milestone)?;
        line.push('\n');

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| self.io_error(source))?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|source| self.io_error(source))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|source| self.io_error(source))?;
        file.flush().await.map_err(|source| self.io_error(source))?;
        Ok(())
    }

    async fn current_len(&self) -> GateResult<u64> {
        match tokio::fs::metadata(&self.path).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(source) => Err(self.io_error(source)),
        }
    }

    fn io_error(&self, source: io::Error) -> GateError {
        GateError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl MilestoneChannel for SpoolChannel {
    fn publish(&self, milestone: Milestone) -> BoxFuture<'_, GateResult<()>> {
        Box::pin(async move {
            self.append(&milestone).await?;
            debug!(component = %milestone.component, spool = %self.path.display(), "Appended milestone");
            Ok(())
        })
    }

    fn subscribe(&self) -> BoxFuture<'_, GateResult<MilestoneStream>> {
        Box::pin(async move {
            let tail = Tail {
                path: self.path.clone(),
                poll_interval: self.poll_interval,
                offset: self.current_len().await?,
                partial: Vec::new(),
                pending: VecDeque::new(),
            };
            let stream = futures::stream::unfold(tail, |mut tail| async move {
                let next = tail.next().await;
                Some((next, tail))
            });
            Ok(Box::pin(stream) as MilestoneStream)
        })
    }

    fn in_history<'a>(&'a self, component: &'a ComponentKey) -> BoxFuture<'a, GateResult<bool>> {
        Box::pin(self.has_milestone(component.as_str()))
    }
}

fn history_contains(contents: &str, component: &str) -> bool {
    contents
        .lines()
        .filter_map(|line| serde_json::from_str::<Milestone>(line).ok())
        .any(|milestone| milestone.component.as_str() == component)
}

/// Read position of one subscriber.
struct Tail {
    path: PathBuf,
    poll_interval: Duration,
    offset: u64,
    /// Bytes after the last newline; decoded once the line is complete.
    partial: Vec<u8>,
    pending: VecDeque<Milestone>,
}

impl Tail {
    async fn next(&mut self) -> GateResult<Milestone> {
        loop {
            if let Some(milestone) = self.pending.pop_front() {
                return Ok(milestone);
            }
            if !self.read_new_lines().await? {
                tokio::time::sleep(self.poll_interval).await;
            }
        }
    }

    /// Read anything appended since the last read. Returns whether bytes were read.
    async fn read_new_lines(&mut self) -> GateResult<bool> {
        let mut file = match tokio::fs::File::open(&self.path).await {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(source) => return Err(self.io_error(source)),
        };

        let len = file
            .metadata()
            .await
            .map_err(|source| self.io_error(source))?
            .len();
        if len < self.offset {
            warn!(spool = %self.path.display(), "Milestone spool was truncated, reading from start");
            self.offset = 0;
            self.partial.clear();
        }
        if len == self.offset {
            return Ok(false);
        }

        file.seek(SeekFrom::Start(self.offset))
            .await
            .map_err(|source| self.io_error(source))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .await
            .map_err(|source| self.io_error(source))?;
        self.offset += bytes.len() as u64;
        self.partial.extend_from_slice(&bytes);

        // Keep a trailing incomplete line for the next read.
        let complete = match self.partial.iter().rposition(|b| *b == b'\n') {
            Some(idx) => {
                let rest = self.partial.split_off(idx + 1);
                std::mem::replace(&mut self.partial, rest)
            }
            None => return Ok(true),
        };

        for raw in complete.split(|b| *b == b'\n') {
            let line = match std::str::from_utf8(raw) {
                Ok(line) => line.trim(),
                Err(e) => {
                    warn!(error = %e, "Skipping milestone line that is not UTF-8");
                    continue;
                }
            };
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<Milestone>(line) {
                Ok(milestone) => self.pending.push_back(milestone),
                Err(e) => warn!(error = %e, "Skipping malformed milestone line"),
            }
        }
        Ok(true)
    }

    fn io_error(&self, source: io::Error) -> GateError {
        GateError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::MilestoneGate;
    use futures::StreamExt;
    use std::sync::Arc;
    use tempfile::TempDir;

    const POLL: Duration = Duration::from_millis(10);

    #[tokio::test]
    async fn test_publish_appends_json_lines() {
        let dir = TempDir::new().unwrap();
        let channel = SpoolChannel::new(dir.path().join("nested"), POLL);

        channel.publish(Milestone::installed("jdk")).await.unwrap();
        channel.publish(Milestone::skipped("cdk")).await.unwrap();

        let contents = std::fs::read_to_string(channel.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: Milestone = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.component.as_str(), "jdk");
    }

    #[tokio::test]
    async fn test_subscriber_only_sees_new_milestones() {
        let dir = TempDir::new().unwrap();
        let channel = SpoolChannel::new(dir.path(), POLL);
        channel.publish(Milestone::installed("jdk")).await.unwrap();

        let mut stream = channel.subscribe().await.unwrap();
        channel.publish(Milestone::installed("cdk")).await.unwrap();

        let next = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(next.component.as_str(), "cdk");
    }

    #[tokio::test]
    async fn test_history_query() {
        let dir = TempDir::new().unwrap();
        let channel = SpoolChannel::new(dir.path(), POLL);
        assert!(!channel.has_milestone("jdk").await.unwrap());

        channel.publish(Milestone::installed("jdk")).await.unwrap();
        assert!(channel.has_milestone("jdk").await.unwrap());
        assert!(!channel.has_milestone("cdk").await.unwrap());
        assert!(channel.in_history(&ComponentKey::new("jdk")).await.unwrap());
    }

    #[tokio::test]
    async fn test_line_split_inside_multibyte_char_decodes_intact() {
        let dir = TempDir::new().unwrap();
        let channel = SpoolChannel::new(dir.path(), POLL);
        let mut tail = Tail {
            path: channel.path().to_path_buf(),
            poll_interval: POLL,
            offset: 0,
            partial: Vec::new(),
            pending: VecDeque::new(),
        };

        let mut line = serde_json::to_vec(&Milestone::installed("jdk-für-dev")).unwrap();
        line.push(b'\n');
        let split = line.iter().position(|b| *b == 0xC3).unwrap() + 1;

        std::fs::write(channel.path(), &line[..split]).unwrap();
        assert!(tail.read_new_lines().await.unwrap());
        assert!(tail.pending.is_empty());

        std::fs::write(channel.path(), &line).unwrap();
        assert!(tail.read_new_lines().await.unwrap());
        let milestone = tail.pending.pop_front().unwrap();
        assert_eq!(milestone.component.as_str(), "jdk-für-dev");
    }

    #[tokio::test]
    async fn test_gate_resolves_from_earlier_spool_entry() {
        let dir = TempDir::new().unwrap();
        SpoolChannel::new(dir.path(), POLL)
            .publish(Milestone::installed("jdk"))
            .await
            .unwrap();

        let gate = MilestoneGate::new(Arc::new(SpoolChannel::new(dir.path(), POLL)));
        gate.await_milestone(
            &ComponentKey::new("jdk"),
            || false,
            Some(Duration::from_secs(2)),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_malformed_lines_are_skipped() {
        let dir = TempDir::new().unwrap();
        let channel = SpoolChannel::new(dir.path(), POLL);
        let mut stream = channel.subscribe().await.unwrap();

        std::fs::write(channel.path(), "not json\n").unwrap();
        channel.publish(Milestone::installed("jdk")).await.unwrap();

        let next = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(next.component.as_str(), "jdk");
    }

    #[tokio::test]
    async fn test_gate_across_channel_instances() {
        let dir = TempDir::new().unwrap();
        let waiter_gate = MilestoneGate::new(Arc::new(SpoolChannel::new(dir.path(), POLL)));
        let emitter_gate = MilestoneGate::new(Arc::new(SpoolChannel::new(dir.path(), POLL)));

        let waiter = tokio::spawn(async move {
            waiter_gate
                .await_milestone(
                    &ComponentKey::new("jdk"),
                    || false,
                    Some(Duration::from_secs(5)),
                )
                .await
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        emitter_gate
            .emit(Milestone::installed("virtualbox"))
            .await
            .unwrap();
        emitter_gate.emit(Milestone::installed("jdk")).await.unwrap();

        waiter.await.unwrap().unwrap();
    }
}
