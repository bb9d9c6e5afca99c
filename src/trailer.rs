//! Trailer presence rules for movie and TV show folders.
//!
//! Movies keep their trailer as a sibling file named after the folder
//! (`Inception (2010)/Inception (2010)-trailer.mp4`). TV shows keep theirs
//! in a dedicated subdirectory (`Dark/trailers/`), where any non-empty video
//! file counts. The downloader writes to exactly the path
//! [`TrailerRule::expected_path`] reports, so the rule and the downloader
//! can never disagree on location.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::MediaKind;

/// Filename suffix appended to a movie folder's name to form its trailer
/// filename.
pub const TRAILER_SUFFIX: &str = "-trailer.mp4";

/// Trailer filename the downloader writes inside a TV show's trailers
/// directory.
pub const TRAILER_BASENAME: &str = "trailer.mp4";

/// Default name of the TV show trailers subdirectory.
pub const DEFAULT_TRAILERS_DIR: &str = "trailers";

/// Video file extensions recognized inside a trailers directory.
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "webm", "avi", "m4v", "mov"];

/// Check if a path has a video file extension.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use trailforge::trailer::is_video_file;
///
/// assert!(is_video_file(Path::new("trailer.mp4")));
/// assert!(is_video_file(Path::new("/path/to/teaser.MKV")));
/// assert!(!is_video_file(Path::new("poster.jpg")));
/// ```
pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Decides where a media folder's trailer belongs and whether one is there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrailerRule {
    /// Sibling `<folder>-trailer.mp4` file inside the movie folder.
    Movie,
    /// Dedicated trailers subdirectory; any non-empty video file counts.
    TvShow { trailers_dir: String },
}

impl TrailerRule {
    /// Build the rule for a media kind, with the configured TV trailers
    /// directory name (ignored for movies).
    pub fn for_kind(kind: MediaKind, trailers_dir: &str) -> Self {
        match kind {
            MediaKind::Movie => Self::Movie,
            MediaKind::TvShow => Self::TvShow {
                trailers_dir: trailers_dir.to_string(),
            },
        }
    }

    /// The exact path a downloaded trailer must be written to.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use trailforge::trailer::TrailerRule;
    ///
    /// let rule = TrailerRule::Movie;
    /// assert_eq!(
    ///     rule.expected_path(Path::new("/movies/Inception (2010)")),
    ///     Path::new("/movies/Inception (2010)/Inception (2010)-trailer.mp4"),
    /// );
    /// ```
    pub fn expected_path(&self, media_folder: &Path) -> PathBuf {
        match self {
            Self::Movie => {
                let name = folder_name(media_folder);
                media_folder.join(format!("{name}{TRAILER_SUFFIX}"))
            }
            Self::TvShow { trailers_dir } => {
                media_folder.join(trailers_dir).join(TRAILER_BASENAME)
            }
        }
    }

    /// Check whether `media_folder` already has a trailer.
    ///
    /// A zero-byte file never counts; an interrupted download must be
    /// reported as missing so the next fetch retries it. Errors with
    /// [`Error::NotFound`] when the folder itself is missing or not a
    /// directory, so callers can tell "no trailer" from "can't look".
    pub fn has_trailer(&self, media_folder: &Path) -> Result<bool> {
        if !media_folder.is_dir() {
            return Err(Error::not_found(media_folder));
        }
        match self {
            Self::Movie => movie_has_trailer(media_folder),
            Self::TvShow { trailers_dir } => tv_has_trailer(media_folder, trailers_dir),
        }
    }
}

/// Last path component as a str, empty when the path has none.
fn folder_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or("")
}

/// Look for `<folder>-trailer.mp4` next to the movie files.
///
/// The expected name keeps the folder's casing, but the comparison against
/// the actual listing is case-insensitive so a `...-Trailer.MP4` still
/// counts on case-sensitive filesystems.
fn movie_has_trailer(folder: &Path) -> Result<bool> {
    let expected = format!("{}{}", folder_name(folder), TRAILER_SUFFIX);
    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name.eq_ignore_ascii_case(&expected) {
            let meta = entry.metadata()?;
            if meta.is_file() && meta.len() > 0 {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

/// Look for any non-empty video file inside the show's trailers directory.
///
/// The directory name match is case-insensitive. Season directories are
/// never searched; only the dedicated trailers directory counts.
fn tv_has_trailer(folder: &Path, trailers_dir: &str) -> Result<bool> {
    let Some(dir) = find_trailers_dir(folder, trailers_dir)? else {
        return Ok(false);
    };
    for entry in fs::read_dir(&dir)? {
        let entry = entry?;
        if !is_video_file(&entry.path()) {
            continue;
        }
        let meta = entry.metadata()?;
        if meta.is_file() && meta.len() > 0 {
            return Ok(true);
        }
    }
    Ok(false)
}

fn find_trailers_dir(folder: &Path, trailers_dir: &str) -> Result<Option<PathBuf>> {
    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name.eq_ignore_ascii_case(trailers_dir) && entry.file_type()?.is_dir() {
            return Ok(Some(entry.path()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    use assert_matches::assert_matches;
    use tempfile::TempDir;

    fn write_file(path: &Path, bytes: &[u8]) {
        let mut f = File::create(path).unwrap();
        f.write_all(bytes).unwrap();
    }

    fn movie_folder(root: &TempDir, name: &str) -> PathBuf {
        let dir = root.path().join(name);
        fs::create_dir(&dir).unwrap();
        dir
    }

    #[test]
    fn test_is_video_file() {
        assert!(is_video_file(Path::new("trailer.mp4")));
        assert!(is_video_file(Path::new("trailer.mkv")));
        assert!(is_video_file(Path::new("trailer.avi")));
        assert!(is_video_file(Path::new("trailer.m4v")));
        assert!(is_video_file(Path::new("trailer.mov")));

        // Case insensitive
        assert!(is_video_file(Path::new("trailer.MP4")));
        assert!(is_video_file(Path::new("trailer.Mkv")));

        // Not video files
        assert!(!is_video_file(Path::new("poster.jpg")));
        assert!(!is_video_file(Path::new("notes.txt")));
        assert!(!is_video_file(Path::new("no_extension")));
    }

    #[test]
    fn test_movie_expected_path() {
        let rule = TrailerRule::Movie;
        assert_eq!(
            rule.expected_path(Path::new("/movies/Inception (2010)")),
            Path::new("/movies/Inception (2010)/Inception (2010)-trailer.mp4"),
        );
    }

    #[test]
    fn test_tv_expected_path() {
        let rule = TrailerRule::for_kind(MediaKind::TvShow, DEFAULT_TRAILERS_DIR);
        assert_eq!(
            rule.expected_path(Path::new("/tv/Dark")),
            Path::new("/tv/Dark/trailers/trailer.mp4"),
        );

        let rule = TrailerRule::for_kind(MediaKind::TvShow, "previews");
        assert_eq!(
            rule.expected_path(Path::new("/tv/Dark")),
            Path::new("/tv/Dark/previews/trailer.mp4"),
        );
    }

    #[test]
    fn test_movie_trailer_present() {
        let root = TempDir::new().unwrap();
        let folder = movie_folder(&root, "Inception (2010)");
        write_file(&folder.join("Inception (2010)-trailer.mp4"), &[0u8; 1024]);

        let rule = TrailerRule::Movie;
        assert!(rule.has_trailer(&folder).unwrap());
    }

    #[test]
    fn test_movie_trailer_zero_byte_counts_as_missing() {
        let root = TempDir::new().unwrap();
        let folder = movie_folder(&root, "Inception (2010)");
        write_file(&folder.join("Inception (2010)-trailer.mp4"), &[]);

        let rule = TrailerRule::Movie;
        assert!(!rule.has_trailer(&folder).unwrap());
    }

    #[test]
    fn test_movie_trailer_case_insensitive_match() {
        let root = TempDir::new().unwrap();
        let folder = movie_folder(&root, "Inception (2010)");
        write_file(&folder.join("inception (2010)-Trailer.MP4"), b"video");

        let rule = TrailerRule::Movie;
        assert!(rule.has_trailer(&folder).unwrap());
    }

    #[test]
    fn test_movie_other_files_do_not_count() {
        let root = TempDir::new().unwrap();
        let folder = movie_folder(&root, "Inception (2010)");
        write_file(&folder.join("Inception (2010).mkv"), b"feature");
        write_file(&folder.join("trailer.mp4"), b"wrong name");

        let rule = TrailerRule::Movie;
        assert!(!rule.has_trailer(&folder).unwrap());
    }

    #[test]
    fn test_missing_folder_is_not_found() {
        let root = TempDir::new().unwrap();
        let gone = root.path().join("Vanished (1999)");

        let rule = TrailerRule::Movie;
        assert_matches!(rule.has_trailer(&gone), Err(Error::NotFound(_)));
    }

    #[test]
    fn test_file_instead_of_folder_is_not_found() {
        let root = TempDir::new().unwrap();
        let file = root.path().join("not-a-folder");
        write_file(&file, b"plain file");

        let rule = TrailerRule::Movie;
        assert_matches!(rule.has_trailer(&file), Err(Error::NotFound(_)));
    }

    #[test]
    fn test_tv_trailer_present() {
        let root = TempDir::new().unwrap();
        let show = movie_folder(&root, "Dark");
        fs::create_dir(show.join("trailers")).unwrap();
        write_file(&show.join("trailers").join("trailer.mp4"), b"video");

        let rule = TrailerRule::for_kind(MediaKind::TvShow, DEFAULT_TRAILERS_DIR);
        assert!(rule.has_trailer(&show).unwrap());
    }

    #[test]
    fn test_tv_any_video_filename_counts() {
        let root = TempDir::new().unwrap();
        let show = movie_folder(&root, "Dark");
        fs::create_dir(show.join("trailers")).unwrap();
        write_file(&show.join("trailers").join("season-one-teaser.mkv"), b"video");

        let rule = TrailerRule::for_kind(MediaKind::TvShow, DEFAULT_TRAILERS_DIR);
        assert!(rule.has_trailer(&show).unwrap());
    }

    #[test]
    fn test_tv_zero_byte_trailer_counts_as_missing() {
        let root = TempDir::new().unwrap();
        let show = movie_folder(&root, "Dark");
        fs::create_dir(show.join("trailers")).unwrap();
        write_file(&show.join("trailers").join("trailer.mp4"), &[]);

        let rule = TrailerRule::for_kind(MediaKind::TvShow, DEFAULT_TRAILERS_DIR);
        assert!(!rule.has_trailer(&show).unwrap());
    }

    #[test]
    fn test_tv_trailers_dir_case_insensitive() {
        let root = TempDir::new().unwrap();
        let show = movie_folder(&root, "Dark");
        fs::create_dir(show.join("Trailers")).unwrap();
        write_file(&show.join("Trailers").join("trailer.mp4"), b"video");

        let rule = TrailerRule::for_kind(MediaKind::TvShow, DEFAULT_TRAILERS_DIR);
        assert!(rule.has_trailer(&show).unwrap());
    }

    #[test]
    fn test_tv_empty_or_absent_trailers_dir() {
        let root = TempDir::new().unwrap();

        let no_dir = movie_folder(&root, "Severance");
        let empty_dir = movie_folder(&root, "Dark");
        fs::create_dir(empty_dir.join("trailers")).unwrap();

        let rule = TrailerRule::for_kind(MediaKind::TvShow, DEFAULT_TRAILERS_DIR);
        assert!(!rule.has_trailer(&no_dir).unwrap());
        assert!(!rule.has_trailer(&empty_dir).unwrap());
    }

    #[test]
    fn test_tv_non_video_files_do_not_count() {
        let root = TempDir::new().unwrap();
        let show = movie_folder(&root, "Dark");
        fs::create_dir(show.join("trailers")).unwrap();
        write_file(&show.join("trailers").join("notes.txt"), b"todo");
        write_file(&show.join("trailers").join("cover.jpg"), b"image");

        let rule = TrailerRule::for_kind(MediaKind::TvShow, DEFAULT_TRAILERS_DIR);
        assert!(!rule.has_trailer(&show).unwrap());
    }

    #[test]
    fn test_tv_season_dirs_not_searched() {
        let root = TempDir::new().unwrap();
        let show = movie_folder(&root, "Dark");
        fs::create_dir(show.join("Season 01")).unwrap();
        write_file(&show.join("Season 01").join("trailer.mp4"), b"video");

        let rule = TrailerRule::for_kind(MediaKind::TvShow, DEFAULT_TRAILERS_DIR);
        assert!(!rule.has_trailer(&show).unwrap());
    }

    #[test]
    fn test_downloader_and_rule_agree_on_movie_path() {
        let root = TempDir::new().unwrap();
        let folder = movie_folder(&root, "Blade Runner 2049 (2017)");

        let rule = TrailerRule::Movie;
        let target = rule.expected_path(&folder);
        assert!(!rule.has_trailer(&folder).unwrap());

        // A file written at exactly the expected path flips presence.
        write_file(&target, b"downloaded");
        assert!(rule.has_trailer(&folder).unwrap());
    }
}
