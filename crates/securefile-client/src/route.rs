//! Route joining

/// Join a remote path onto a base route.
///
/// Empty and `.` segments are dropped, duplicate slashes collapse, and `..`
/// never climbs above the base route.
pub(crate) fn join(base: &str, rest: &str) -> String {
    let mut segments: Vec<&str> = base
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();
    let floor = segments.len();

    for segment in rest.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.len() > floor {
                    segments.pop();
                }
            }
            s => segments.push(s),
        }
    }

    format!("/{}", segments.join("/"))
}
