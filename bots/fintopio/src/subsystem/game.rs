use super::{pause, Subsystem, SubsystemContext, SubsystemReport};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use core_logic::success;
use rand::Rng;
use tracing::{error, info};

/// `floor(max_score * p / 100)` for `p` uniform in `[min_percent, max_percent]`.
pub fn synthetic_score<R: Rng + ?Sized>(
    max_score: f64,
    min_percent: f64,
    max_percent: f64,
    rng: &mut R,
) -> u64 {
    let percent = if max_percent > min_percent {
        rng.gen_range(min_percent..=max_percent)
    } else {
        min_percent
    };
    (max_score * percent / 100.0).floor().max(0.0) as u64
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameSummary {
    pub rounds: u32,
    pub played: u32,
    pub submitted: u32,
}

/// Plays a random number of space-tapper rounds and submits a plausible score for each.
pub struct GameHandler;

#[async_trait]
impl Subsystem<SubsystemContext> for GameHandler {
    async fn run(&self, ctx: &SubsystemContext) -> Result<SubsystemReport> {
        let game = &ctx.config.game;
        if !game.enabled {
            return Ok(SubsystemReport::new("disabled"));
        }

        let settings = ctx
            .api
            .game_settings()
            .await
            .context("Error fetching game settings")?;
        let max_score = settings
            .max_score
            .ok_or_else(|| anyhow!("Game settings carry no maxScore"))?;

        let mut summary = GameSummary {
            rounds: rand::thread_rng().gen_range(game.min_games..=game.max_games),
            ..GameSummary::default()
        };
        info!("Playing {} game rounds", summary.rounds);

        for round in 1..=summary.rounds {
            pause(&game.time_until_play, "starting the game").await;
            pause(&game.play_duration, "finishing the game").await;

            let score = synthetic_score(
                max_score,
                game.min_percent,
                game.max_percent,
                &mut rand::thread_rng(),
            );
            summary.played += 1;
            info!("Game {}/{} played, score {}", round, summary.rounds, score);

            match ctx.api.submit_game(score).await {
                Ok(result) => {
                    let reward = result
                        .and_then(|r| r.actual_reward)
                        .map(|r| r.to_string())
                        .unwrap_or_else(|| "0".to_string());
                    success!("Game result submitted, reward {}", reward);
                    summary.submitted += 1;
                }
                Err(e) => error!("Error submitting game result: {}", e),
            }

            if round < summary.rounds {
                pause(&game.between_rounds, "the next round").await;
            }
        }

        Ok(SubsystemReport::new(format!(
            "played {} | submitted {}",
            summary.played, summary.submitted
        )))
    }

    fn name(&self) -> &str {
        "game"
    }
}
