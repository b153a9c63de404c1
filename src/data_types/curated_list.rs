/// Curated TMDB movie lists that make up the home feed.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CuratedList {
  Popular,
  Trending,
  NowPlaying,
}

impl CuratedList {
  pub fn path(&self) -> &'static str {
    match self {
      CuratedList::Popular => "movie/popular",
      CuratedList::Trending => "trending/movie/week",
      CuratedList::NowPlaying => "movie/now_playing",
    }
  }
}
