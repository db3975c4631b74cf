//! Logical TMDB resources, their cache keys and upstream paths.

use std::fmt;

/// A request the gateway knows how to serve.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TmdbResource {
    Trending,
    Popular,
    TvPopular,
    TvTopRated,
    TvOnTheAir,
    TvAiringToday,
    /// Movies discovered by genre id.
    Genre(u32),
    /// Movie details by id.
    Movie(u64),
    /// TV show details by id.
    Tv(u64),
    TvSeason { show: u64, season: u32 },
    /// Free-text search. Never cached.
    Search(String),
}

impl TmdbResource {
    /// Deterministic cache key, or `None` for resources that must always be
    /// fetched fresh.
    pub fn cache_key(&self) -> Option<String> {
        let key = match self {
            Self::Trending => "trending".to_string(),
            Self::Popular => "popular".to_string(),
            Self::TvPopular => "tv-popular".to_string(),
            Self::TvTopRated => "tv-top-rated".to_string(),
            Self::TvOnTheAir => "tv-on-the-air".to_string(),
            Self::TvAiringToday => "tv-airing-today".to_string(),
            Self::Genre(id) => format!("genre-{id}"),
            Self::Movie(id) => format!("movie-{id}"),
            Self::Tv(id) => format!("tv-{id}"),
            Self::TvSeason { show, season } => format!("tv-{show}-season-{season}"),
            Self::Search(_) => return None,
        };
        Some(key)
    }

    /// Path relative to the API base URL.
    pub fn path(&self) -> String {
        match self {
            Self::Trending => "/trending/movie/week".to_string(),
            Self::Popular => "/movie/popular".to_string(),
            Self::TvPopular => "/tv/popular".to_string(),
            Self::TvTopRated => "/tv/top_rated".to_string(),
            Self::TvOnTheAir => "/tv/on_the_air".to_string(),
            Self::TvAiringToday => "/tv/airing_today".to_string(),
            Self::Genre(_) => "/discover/movie".to_string(),
            Self::Movie(id) => format!("/movie/{id}"),
            Self::Tv(id) => format!("/tv/{id}"),
            Self::TvSeason { show, season } => format!("/tv/{show}/season/{season}"),
            Self::Search(_) => "/search/multi".to_string(),
        }
    }

    /// Resource-specific query parameters (the API key is added by the client).
    pub fn query(&self) -> Vec<(String, String)> {
        match self {
            Self::Genre(id) => vec![("with_genres".to_string(), id.to_string())],
            Self::Movie(_) | Self::Tv(_) => vec![(
                "append_to_response".to_string(),
                "videos,credits".to_string(),
            )],
            Self::Search(query) => vec![
                ("query".to_string(), query.clone()),
                ("include_adult".to_string(), "false".to_string()),
            ],
            _ => Vec::new(),
        }
    }

    /// True when the response is a paged `results` list rather than a
    /// single detail record.
    pub fn is_list(&self) -> bool {
        !matches!(self, Self::Movie(_) | Self::Tv(_) | Self::TvSeason { .. })
    }

    /// Parse the CLI form: `trending`, `popular`, `tv-popular`, `tv-top-rated`,
    /// `tv-on-the-air`, `tv-airing-today`, `genre <id>`, `movie <id>`,
    /// `tv <id>`, `season <show> <n>`, `search <text...>`.
    pub fn from_args(name: &str, args: &[String]) -> Option<Self> {
        let num = |i: usize| args.get(i).and_then(|s| s.parse::<u64>().ok());
        let resource = match name {
            "trending" => Self::Trending,
            "popular" => Self::Popular,
            "tv-popular" => Self::TvPopular,
            "tv-top-rated" => Self::TvTopRated,
            "tv-on-the-air" => Self::TvOnTheAir,
            "tv-airing-today" => Self::TvAiringToday,
            "genre" => Self::Genre(u32::try_from(num(0)?).ok()?),
            "movie" => Self::Movie(num(0)?),
            "tv" => Self::Tv(num(0)?),
            "season" => Self::TvSeason {
                show: num(0)?,
                season: u32::try_from(num(1)?).ok()?,
            },
            "search" => {
                let query = args.join(" ");
                if query.trim().is_empty() {
                    return None;
                }
                Self::Search(query)
            }
            _ => return None,
        };
        Some(resource)
    }
}

impl fmt::Display for TmdbResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Search(q) => write!(f, "search({q})"),
            other => f.write_str(other.cache_key().as_deref().unwrap_or("?")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn season(show: u64, season: u32) -> TmdbResource {
        TmdbResource::TvSeason { show, season }
    }

    #[test]
    fn test_flat_cache_keys() {
        assert_eq!(TmdbResource::Trending.cache_key().as_deref(), Some("trending"));
        assert_eq!(TmdbResource::Popular.cache_key().as_deref(), Some("popular"));
        assert_eq!(TmdbResource::TvPopular.cache_key().as_deref(), Some("tv-popular"));
        assert_eq!(TmdbResource::TvTopRated.cache_key().as_deref(), Some("tv-top-rated"));
        assert_eq!(TmdbResource::TvOnTheAir.cache_key().as_deref(), Some("tv-on-the-air"));
        assert_eq!(
            TmdbResource::TvAiringToday.cache_key().as_deref(),
            Some("tv-airing-today")
        );
    }

    #[test]
    fn test_composite_cache_keys() {
        assert_eq!(TmdbResource::Genre(28).cache_key().as_deref(), Some("genre-28"));
        assert_eq!(TmdbResource::Movie(603).cache_key().as_deref(), Some("movie-603"));
        assert_eq!(TmdbResource::Tv(1399).cache_key().as_deref(), Some("tv-1399"));
        assert_eq!(
            season(1399, 2).cache_key().as_deref(),
            Some("tv-1399-season-2")
        );
    }

    #[test]
    fn test_search_is_never_cached() {
        assert!(TmdbResource::Search("matrix".into()).cache_key().is_none());
    }

    #[test]
    fn test_paths_and_query() {
        assert_eq!(TmdbResource::Movie(603).path(), "/movie/603");
        assert_eq!(
            season(1399, 2).path(),
            "/tv/1399/season/2"
        );
        let q = TmdbResource::Genre(28).query();
        assert_eq!(q, vec![("with_genres".to_string(), "28".to_string())]);
        let q = TmdbResource::Search("the matrix".into()).query();
        assert!(q.contains(&("query".to_string(), "the matrix".to_string())));
    }

    #[test]
    fn test_is_list() {
        assert!(TmdbResource::Popular.is_list());
        assert!(TmdbResource::Search("x".into()).is_list());
        assert!(!TmdbResource::Movie(1).is_list());
        assert!(!season(1, 1).is_list());
    }

    #[test]
    fn test_from_args() {
        let args = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(TmdbResource::from_args("popular", &[]), Some(TmdbResource::Popular));
        assert_eq!(
            TmdbResource::from_args("movie", &args(&["603"])),
            Some(TmdbResource::Movie(603))
        );
        assert_eq!(
            TmdbResource::from_args("season", &args(&["1399", "2"])),
            Some(season(1399, 2))
        );
        assert_eq!(
            TmdbResource::from_args("search", &args(&["the", "matrix"])),
            Some(TmdbResource::Search("the matrix".into()))
        );
        assert_eq!(TmdbResource::from_args("movie", &args(&["abc"])), None);
        assert_eq!(TmdbResource::from_args("search", &[]), None);
        assert_eq!(TmdbResource::from_args("upcoming", &[]), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(TmdbResource::Tv(1399).to_string(), "tv-1399");
        assert_eq!(TmdbResource::Search("dune".into()).to_string(), "search(dune)");
    }
}
