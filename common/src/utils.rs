use core::fmt::{self, Debug, Display, Formatter};
use std::path::{Path, PathBuf};

/// Looks for an entry whose name starts with `name` in the current working
/// directory, the directory of the running executable, and their ancestors.
/// Returns `name` joined to the first directory that has one.
pub fn search_current_ancestor_dirs_for(name: &str) -> Option<PathBuf> {
    let has_entry = |dir: &Path| {
        dir.read_dir().is_ok_and(|mut entries| {
            entries.any(|entry| {
                entry.is_ok_and(|entry| entry.file_name().to_string_lossy().starts_with(name))
            })
        })
    };
    [std::env::current_dir(), std::env::current_exe()]
        .into_iter()
        .flatten()
        .find_map(|start| start.ancestors().find(|dir| has_entry(dir)).map(Path::to_path_buf))
        .map(|dir| dir.join(name))
}

/// Formats the items of an iterator separated by commas.
#[derive(Clone)]
pub struct CommaSeparated<I>(I);

pub fn comma_separated<I>(items: I) -> CommaSeparated<I>
where
    I: IntoIterator + Clone,
{
    CommaSeparated(items)
}

impl<I> CommaSeparated<I>
where
    I: IntoIterator + Clone,
{
    fn write_with(
        &self,
        f: &mut Formatter<'_>,
        item: impl Fn(&mut Formatter<'_>, I::Item) -> fmt::Result,
    ) -> fmt::Result {
        for (index, value) in self.0.clone().into_iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            item(f, value)?;
        }
        Ok(())
    }
}

impl<I> Display for CommaSeparated<I>
where
    I: IntoIterator + Clone,
    I::Item: Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.write_with(f, |f, item| Display::fmt(&item, f))
    }
}

impl<I> Debug for CommaSeparated<I>
where
    I: IntoIterator + Clone,
    I::Item: Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.write_with(f, |f, item| Debug::fmt(&item, f))
    }
}
