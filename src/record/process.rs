use std::borrow::Cow;
use std::path::Path;

/// A process observed on a node.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct Process {
    pub pid: i32,
    pub ppid: i32,
    pub state: String,
    pub threads: i32,
    /// Accumulated CPU time in seconds.
    pub cpu_time: f64,
    /// Virtual memory size in bytes.
    pub virtual_memory: u64,
    /// Resident set size in bytes.
    pub resident_memory: u64,
    /// Short command name (`/proc/<pid>/comm`).
    pub command: String,
    /// Path of the executable (`/proc/<pid>/exe`), empty if unknown.
    pub executable: String,
    /// Full argument string (`/proc/<pid>/cmdline`).
    pub args: String,
}

impl Process {
    /// Returns the command line to display for this process.
    ///
    /// When the first argument is the base name of the executable, it is
    /// replaced by the full executable path. Processes without a known
    /// executable fall back to their short command name.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fleetps::record::Process;
    /// let process = Process {
    ///     executable: "/bin/foo".to_owned(),
    ///     args: "foo --x".to_owned(),
    ///     ..Default::default()
    /// };
    /// assert_eq!(process.display_command(), "/bin/foo --x");
    /// ```
    pub fn display_command(&self) -> Cow<'_, str> {
        let Some(executable) = self.executable.split_whitespace().next() else {
            return Cow::Borrowed(&self.command);
        };

        match self.args.split_whitespace().next() {
            Some(first) if first == base_name(executable) => {
                Cow::Owned(self.args.replacen(first, &self.executable, 1))
            }
            _ => Cow::Borrowed(&self.args),
        }
    }
}

fn base_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
}
