use crate::sort::SortKey;

/// State of one interactive dashboard run. Owned by the event loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    sort_key: SortKey,
    frame: Option<String>,
    width: u16,
    height: u16,
}

impl Session {
    pub fn new(sort_key: SortKey) -> Self {
        Self {
            sort_key,
            ..Default::default()
        }
    }

    /// The ordering the next refresh will use.
    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn set_sort_key(&mut self, sort_key: SortKey) {
        if self.sort_key != sort_key {
            log::debug!("Sort key changed to `{sort_key}`");
        }
        self.sort_key = sort_key;
    }

    /// The frame currently on screen, if any has been painted.
    pub fn frame(&self) -> Option<&str> {
        self.frame.as_deref()
    }

    pub fn show(&mut self, frame: String) {
        self.frame = Some(frame);
    }

    pub fn dimensions(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }
}
