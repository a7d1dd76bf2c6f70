/// Destination planning for dated photos.
///
/// A photo taken on 2018-12-09 under root `/photos` belongs at
/// `/photos/2018/2018-12-09/<file name>`. The mapping depends on nothing but
/// the root, the file's base name and its capture timestamp.
use crate::metadata::CaptureTimestamp;
use std::path::{Path, PathBuf};

/// Name of the per-year directory, e.g. `2018`.
pub fn year_dir_name(timestamp: &CaptureTimestamp) -> String {
    format!("{:04}", timestamp.year())
}

/// Name of the per-day directory, e.g. `2018-12-09`.
pub fn date_dir_name(timestamp: &CaptureTimestamp) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        timestamp.year(),
        timestamp.month(),
        timestamp.day()
    )
}

/// Computes the canonical destination of `file_path`.
///
/// Returns `None` only when `file_path` has no file name component
/// (for example `/` or a path ending in `..`).
///
/// # Examples
///
/// ```
/// use phototidy::metadata::parse_capture_timestamp;
/// use phototidy::planner::plan_destination;
/// use std::path::Path;
///
/// let ts = parse_capture_timestamp("2018:12:09 14:30:00").unwrap();
/// let dest = plan_destination(Path::new("/photos"), Path::new("/photos/DCIM/IMG_01.jpg"), &ts);
/// assert_eq!(dest.unwrap(), Path::new("/photos/2018/2018-12-09/IMG_01.jpg"));
/// ```
pub fn plan_destination(
    root: &Path,
    file_path: &Path,
    timestamp: &CaptureTimestamp,
) -> Option<PathBuf> {
    let file_name = file_path.file_name()?;
    Some(
        root.join(year_dir_name(timestamp))
            .join(date_dir_name(timestamp))
            .join(file_name),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::parse_capture_timestamp;

    fn ts(raw: &str) -> CaptureTimestamp {
        parse_capture_timestamp(raw).unwrap()
    }

    #[test]
    fn test_plan_pads_month_and_day() {
        let dest = plan_destination(
            Path::new("/photos"),
            Path::new("/photos/100CANON/IMG_7.JPG"),
            &ts("2019:01:05 10:00:00"),
        );
        assert_eq!(
            dest,
            Some(PathBuf::from("/photos/2019/2019-01-05/IMG_7.JPG"))
        );
    }

    #[test]
    fn test_plan_is_deterministic() {
        let root = Path::new("/photos");
        let file = Path::new("/photos/a/b/IMG_01.jpg");
        let stamp = ts("2018:12:09 14:30:00");
        assert_eq!(
            plan_destination(root, file, &stamp),
            plan_destination(root, file, &stamp)
        );
    }

    #[test]
    fn test_plan_ignores_source_directory() {
        let root = Path::new("/photos");
        let stamp = ts("2018:12:09 14:30:00");
        let a = plan_destination(root, Path::new("/photos/x/IMG_01.jpg"), &stamp);
        let b = plan_destination(root, Path::new("/photos/y/z/IMG_01.jpg"), &stamp);
        assert_eq!(a, b);
    }

    #[test]
    fn test_plan_already_in_place() {
        let root = Path::new("/photos");
        let file = Path::new("/photos/2018/2018-12-09/IMG_01.jpg");
        let dest = plan_destination(root, file, &ts("2018:12:09 14:30:00"));
        assert_eq!(dest.as_deref(), Some(file));
    }

    #[test]
    fn test_plan_pads_small_years() {
        let stamp = ts("0987:03:04 00:00:00");
        assert_eq!(year_dir_name(&stamp), "0987");
        assert_eq!(date_dir_name(&stamp), "0987-03-04");
    }

    #[test]
    fn test_plan_without_file_name() {
        let dest = plan_destination(Path::new("/photos"), Path::new("/"), &ts("2018:12:09 14:30:00"));
        assert_eq!(dest, None);
    }
}
