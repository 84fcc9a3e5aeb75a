//! NHL stream catalog
//!
//! The streams a default [`Extractor`](super::Extractor) registers, in
//! registration order. Team-dependent streams hang off `current_teams`,
//! game-dependent streams off `games`.

use crate::error::Result;
use crate::http::HttpClient;
use crate::stream::{
    DateWindow, DependentStream, ExtractStream, IncrementalStream, SimpleStream, StreamDescriptor,
};
use std::sync::Arc;

pub const CURRENT_STANDINGS: &str = "current_standings";
pub const CURRENT_TEAMS: &str = "current_teams";
pub const GAMES: &str = "games";
pub const DAILY_STANDINGS: &str = "daily_standings";
pub const TEAM_ROSTERS: &str = "team_rosters";
pub const SEASON_SCHEDULES: &str = "season_schedules";
pub const GAME_BOXSCORE: &str = "game_boxscore";
pub const GAME_SUMMARIES: &str = "game_summaries";
pub const PLAY_BY_PLAY: &str = "play_by_play";

const NO_PATH: [&str; 0] = [];

/// Build every NHL stream around one shared client
pub fn nhl_streams(
    client: &Arc<HttpClient>,
    window: DateWindow,
) -> Result<Vec<Arc<ExtractStream>>> {
    let simple = |name: &str, endpoint: &str, path: &[&str]| -> Result<Arc<ExtractStream>> {
        let descriptor = StreamDescriptor::new(name, endpoint, path.iter().copied());
        Ok(Arc::new(SimpleStream::new(Arc::clone(client), descriptor)?.into()))
    };
    let incremental = |name: &str, endpoint: &str, path: &[&str]| -> Result<Arc<ExtractStream>> {
        let descriptor = StreamDescriptor::new(name, endpoint, path.iter().copied());
        Ok(Arc::new(
            IncrementalStream::new(Arc::clone(client), descriptor, window)?.into(),
        ))
    };
    let dependent = |name: &str,
                     endpoint: &str,
                     path: &[&str],
                     parent: &Arc<ExtractStream>,
                     parent_key: &str,
                     partition_field: &str|
     -> Result<Arc<ExtractStream>> {
        let descriptor = StreamDescriptor::new(name, endpoint, path.iter().copied());
        Ok(Arc::new(
            DependentStream::new(
                Arc::clone(client),
                descriptor,
                Arc::clone(parent),
                parent_key,
                partition_field,
            )?
            .into(),
        ))
    };

    let current_standings = simple(CURRENT_STANDINGS, "standings/now", &["standings"])?;
    let current_teams = simple(CURRENT_TEAMS, "schedule-calendar/now", &["teams"])?;

    let games = incremental(GAMES, "score/{date}", &["games"])?;
    let daily_standings = incremental(DAILY_STANDINGS, "standings/{date}", &["standings"])?;

    let team_rosters = dependent(
        TEAM_ROSTERS,
        "roster/{team_abv}/current",
        &NO_PATH,
        &current_teams,
        "abbrev",
        "team_abv",
    )?;
    let season_schedules = dependent(
        SEASON_SCHEDULES,
        "club-schedule-season/{team_abv}/now",
        &["games"],
        &current_teams,
        "abbrev",
        "team_abv",
    )?;

    let game_boxscore = dependent(
        GAME_BOXSCORE,
        "gamecenter/{game_id}/boxscore",
        &NO_PATH,
        &games,
        "id",
        "game_id",
    )?;
    let game_summaries = dependent(
        GAME_SUMMARIES,
        "wsc/game-story/{game_id}",
        &NO_PATH,
        &games,
        "id",
        "game_id",
    )?;
    let play_by_play = dependent(
        PLAY_BY_PLAY,
        "gamecenter/{game_id}/play-by-play",
        &NO_PATH,
        &games,
        "id",
        "game_id",
    )?;

    Ok(vec![
        current_standings,
        current_teams,
        games,
        daily_standings,
        team_rosters,
        season_schedules,
        game_boxscore,
        game_summaries,
        play_by_play,
    ])
}
