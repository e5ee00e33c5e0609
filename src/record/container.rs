use std::borrow::Cow;

/// Prefix marking a container that runs inside another container's sandbox.
pub const NESTING_MARKER: &str = "└─ ";

/// A container observed on a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Container {
    pub namespace: String,
    pub id: String,
    /// ID of the sandbox (pod) this container belongs to. Equal to `id` for
    /// the sandbox itself and for standalone containers.
    pub pod_id: String,
    pub name: String,
    pub image: String,
    pub pid: u32,
    pub status: String,
}

impl Container {
    /// Returns true if this container runs inside another container's sandbox.
    pub fn is_nested(&self) -> bool {
        self.id != self.pod_id
    }

    /// Returns the container ID, prefixed with [`NESTING_MARKER`] if the
    /// container is nested.
    pub fn display_id(&self) -> Cow<'_, str> {
        if self.is_nested() {
            Cow::Owned(format!("{NESTING_MARKER}{}", self.id))
        } else {
            Cow::Borrowed(&self.id)
        }
    }
}
