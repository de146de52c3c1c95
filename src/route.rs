//! Client routes of the published site

use std::fmt;

/// A view of the site
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    Calendar,
    Timeline,
    /// Viewer for one record; any missing segment resolves to "not found"
    Diary {
        year: Option<String>,
        month: Option<String>,
        day: Option<String>,
        slug: Option<String>,
    },
}

impl Route {
    /// Parse a site path, with or without the `base` prefix. Unknown paths
    /// return `None`.
    pub fn parse(path: &str, base: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        let base = base.trim_end_matches('/');
        let path = if base.is_empty() {
            path
        } else {
            match path.strip_prefix(base) {
                Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
                _ => path,
            }
        };

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Some(Route::Dashboard),
            ["calendar"] => Some(Route::Calendar),
            ["timeline"] => Some(Route::Timeline),
            ["diary", rest @ ..] if rest.len() <= 4 => {
                let part = |i: usize| rest.get(i).map(|s| s.to_string());
                Some(Route::Diary {
                    year: part(0),
                    month: part(1),
                    day: part(2),
                    slug: part(3),
                })
            }
            _ => None,
        }
    }

    /// Route of the viewer for a record date (`YYYY-MM-DD`) and slug
    pub fn diary(date: &str, slug: &str) -> Self {
        let mut parts = date.splitn(3, '-').map(str::to_string);
        Route::Diary {
            year: parts.next(),
            month: parts.next(),
            day: parts.next(),
            slug: Some(slug.to_string()),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Dashboard => write!(f, "/"),
            Route::Calendar => write!(f, "/calendar"),
            Route::Timeline => write!(f, "/timeline"),
            Route::Diary {
                year,
                month,
                day,
                slug,
            } => {
                write!(f, "/diary")?;
                for part in [year, month, day, slug].into_iter().flatten() {
                    write!(f, "/{}", part)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_static_routes() {
        assert_eq!(Route::parse("/", ""), Some(Route::Dashboard));
        assert_eq!(Route::parse("/daily-record/", "/daily-record"), Some(Route::Dashboard));
        assert_eq!(Route::parse("/daily-record/calendar", "/daily-record"), Some(Route::Calendar));
        assert_eq!(Route::parse("/timeline?q=x", "/daily-record"), Some(Route::Timeline));
        assert_eq!(Route::parse("/settings", ""), None);
    }

    #[test]
    fn test_parse_diary_route() {
        assert_eq!(
            Route::parse("/daily-record/diary/2024/03/05/2", "/daily-record"),
            Some(Route::diary("2024-03-05", "2"))
        );
    }

    #[test]
    fn test_partial_diary_route() {
        let route = Route::parse("/diary/2024/03", "").unwrap();
        assert_eq!(
            route,
            Route::Diary {
                year: Some("2024".to_string()),
                month: Some("03".to_string()),
                day: None,
                slug: None,
            }
        );
        assert_eq!(Route::parse("/diary/2024/03/05/2/extra", ""), None);
    }

    #[test]
    fn test_base_prefix_must_end_at_segment() {
        assert_eq!(Route::parse("/daily-records/calendar", "/daily-record"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Route::diary("2024-03-05", "2").to_string(), "/diary/2024/03/05/2");
        assert_eq!(Route::Calendar.to_string(), "/calendar");
    }
}
