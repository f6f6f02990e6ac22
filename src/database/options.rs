/// Settings for loading a spreadsheet into a database table.
#[derive(Clone, Debug)]
pub struct LoadOptions {
    /// Target table, optionally schema-qualified.
    pub table: String,

    /// Skip data rows where no column carries text.
    pub skip_empty_rows: bool,

    /// Log progress every N inserted rows, 0 disables it.
    pub progress_interval: usize,
}

impl LoadOptions {
    /// Default progress interval
    pub const PROGRESS_INTERVAL: usize = 20;

    /// Creates options for `table` with empty rows skipped
    pub fn new(table: &str) -> Self {
        LoadOptions {
            table: table.to_owned(),
            skip_empty_rows: true,
            progress_interval: Self::PROGRESS_INTERVAL,
        }
    }

    /// Checks whether `inserted` rows is a progress milestone.
    pub(crate) fn is_milestone(&self, inserted: usize) -> bool {
        self.progress_interval > 0 && inserted > 0 && inserted % self.progress_interval == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = LoadOptions::new("people");
        assert_eq!(options.table, "people");
        assert!(options.skip_empty_rows);
        assert_eq!(options.progress_interval, 20);
    }

    #[test]
    fn milestones() {
        let mut options = LoadOptions::new("t");
        assert!(!options.is_milestone(0));
        assert!(!options.is_milestone(19));
        assert!(options.is_milestone(20));
        assert!(options.is_milestone(40));

        options.progress_interval = 0;
        assert!(!options.is_milestone(20));
    }
}
