use std::{
    fs::File,
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use stride_analysis::{
    config::EngineConfig,
    metric::{MetricKey, parse_metric_keys},
    session::SessionRecord,
};
use tracing::warn;

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<&Path>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = Output::from_output_path(output_path)?;
        output.write_json(value)
    }

    pub fn from_output_path(output_path: Option<&Path>) -> anyhow::Result<Self> {
        match output_path {
            Some(path) => Output::open(path.to_owned()),
            None => Ok(Output::stdout()),
        }
    }

    pub fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_json<T>(&mut self, value: T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, &value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self).with_context(|| {
            format!(
                "Failed to write newline after JSON to {}",
                self.display_path()
            )
        })?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Read a JSON array of session records
pub fn read_sessions_file<P>(path: P) -> anyhow::Result<Vec<SessionRecord>>
where
    P: AsRef<Path>,
{
    read_json_file("sessions", path)
}

/// Read and validate an engine configuration, or the defaults when no path is
/// given
pub fn read_config_file(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let config = match path {
        Some(path) => read_json_file::<EngineConfig, _>("config", path)?,
        None => EngineConfig::default(),
    };
    config
        .validate()
        .context("Invalid engine configuration")?;
    Ok(config)
}

/// Resolve metric names from the command line, warning about unknown ones
///
/// An empty list selects every metric.
pub fn resolve_metrics(names: &[String]) -> Vec<MetricKey> {
    if names.is_empty() {
        return MetricKey::ALL.to_vec();
    }
    let (keys, unknown) = parse_metric_keys(names.iter().map(String::as_str));
    for err in &unknown {
        warn!("{err}, skipping");
    }
    keys
}

/// Sessions belonging to `player_id`, or all sessions when no player is given
pub fn sessions_of<'a>(
    sessions: &'a [SessionRecord],
    player_id: Option<&str>,
) -> Vec<&'a SessionRecord> {
    sessions
        .iter()
        .filter(|s| player_id.is_none_or(|id| s.player_id.as_deref() == Some(id)))
        .collect()
}

/// Reference time for period windows: `now` if given, otherwise the current
/// wall-clock time
pub fn reference_time(now: Option<i64>) -> i64 {
    now.unwrap_or_else(|| chrono::Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    #[test]
    fn test_read_sessions_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{ "playerId": "p1", "score": 900, "startTime": 0, "completed": true }}]"#
        )
        .unwrap();
        let sessions = read_sessions_file(file.path()).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].player_id.as_deref(), Some("p1"));
        assert_eq!(sessions[0].accuracy, None);
    }

    #[test]
    fn test_read_config_file_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "comparison": {{ "changePercent": -1 }} }}"#).unwrap();
        assert!(read_config_file(Some(file.path())).is_err());
        assert!(read_config_file(None).is_ok());
    }

    #[test]
    fn test_resolve_metrics_skips_unknown() {
        let names = ["score".to_owned(), "luck".to_owned(), "max_combo".to_owned()];
        assert_eq!(
            resolve_metrics(&names),
            vec![MetricKey::Score, MetricKey::MaxCombo]
        );
        assert_eq!(resolve_metrics(&[]), MetricKey::ALL.to_vec());
    }

    #[test]
    fn test_sessions_of() {
        let mut a = SessionRecord::new(0, 1.0);
        a.player_id = Some("a".to_owned());
        let b = SessionRecord::new(0, 2.0);
        let sessions = [a, b];
        assert_eq!(sessions_of(&sessions, Some("a")).len(), 1);
        assert_eq!(sessions_of(&sessions, None).len(), 2);
    }
}
