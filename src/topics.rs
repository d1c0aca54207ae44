//! Daily rotation of a channel topic with the farming schedule.

use std::sync::Arc;

use chrono::Datelike;
use chrono::Local;
use chrono::Weekday;
use serenity::ChannelId;
use serenity::EditChannel;
use serenity::Http;
use tokio_cron_scheduler::Job;
use tokio_cron_scheduler::JobScheduler;

use crate::serenity;
use crate::TaterError;

/// Farming rotation, one line per weekday starting Monday.
const ROTATION: [&str; 7] = [
    "[Mon] Talent books: Freedom/Prosperity; Weapon Mats: Decarabian/Guyun",
    "[Tue] Talent books: Diligence/Resistance; Weapon Mats: Mist Veiled Elixir/Boreal Wolf",
    "[Wed] Talent books: Ballad/Gold; Weapon Mats: Aerosiderite/Dandelion Gladiator",
    "[Thu] Talent books: Freedom/Prosperity; Weapon Mats: Decarabian/Guyun",
    "[Fri] Talent books: Diligence/Resistance; Weapon Mats: Mist Veiled Elixir/Boreal Wolf",
    "[Sat] Talent books: Ballad/Gold; Weapon Mats: Aerosiderite/Dandelion Gladiator",
    "[Sun] Talent books: ALL; Weapon Mats: ALL",
];

/// Topic line for the given weekday.
pub fn topic_for(day: Weekday) -> &'static str {
    ROTATION[day.num_days_from_monday() as usize]
}

/// Start the cron job that rewrites the channel topic.
pub async fn start(http: Arc<Http>, channel: ChannelId, cron: &str) -> Result<(), TaterError> {
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async(cron, move |_uuid, _lock| {
        let http = http.clone();
        Box::pin(async move {
            if let Err(e) = rotate(&http, channel).await {
                tracing::error!("Failed to rotate the topic of {channel}: {e}");
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    tracing::info!("Topic rotation scheduler started for channel {channel}.");

    Ok(())
}

/// Set the channel topic to today's line.
async fn rotate(http: &Arc<Http>, channel: ChannelId) -> Result<(), TaterError> {
    let topic = topic_for(Local::now().weekday());
    channel
        .edit(http.as_ref(), EditChannel::new().topic(topic))
        .await?;

    tracing::info!("Updated topic of {channel} to \"{topic}\".");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_covers_the_week() {
        assert!(topic_for(Weekday::Mon).starts_with("[Mon]"));
        assert!(topic_for(Weekday::Thu).starts_with("[Thu]"));
        assert!(topic_for(Weekday::Sun).contains("ALL"));
    }

    #[test]
    fn thursday_repeats_monday_materials() {
        let monday = topic_for(Weekday::Mon).split_once(']').unwrap().1;
        let thursday = topic_for(Weekday::Thu).split_once(']').unwrap().1;
        assert_eq!(monday, thursday);
    }
}
