use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use std::time::Duration;

use rand::Rng;

use crate::state::{Delta, PlayerRef, PredictionResult, ProviderCommand, TeamRef};

const DEMO_TEAMS: [(&str, &str); 12] = [
    ("57", "Arsenal"),
    ("58", "Aston Villa"),
    ("61", "Chelsea"),
    ("62", "Everton"),
    ("64", "Liverpool"),
    ("65", "Manchester City"),
    ("66", "Manchester United"),
    ("67", "Newcastle United"),
    ("73", "Tottenham Hotspur"),
    ("76", "Wolverhampton Wanderers"),
    ("397", "Brighton & Hove Albion"),
    ("402", "Brentford"),
];

const DEMO_PLAYERS: [(&str, &str, &str, &str); 8] = [
    ("101", "Bukayo Saka", "FW", "Arsenal"),
    ("102", "Declan Rice", "MF", "Arsenal"),
    ("103", "Mohamed Salah", "FW", "Liverpool"),
    ("104", "Virgil van Dijk", "DF", "Liverpool"),
    ("105", "Erling Haaland", "FW", "Manchester City"),
    ("106", "Rodri", "MF", "Manchester City"),
    ("107", "Cole Palmer", "MF", "Chelsea"),
    ("108", "Jordan Pickford", "GK", "Everton"),
];

/// Spawn the offline demo provider. Same channel contract as the live one:
/// canned directory data, synthetic predictions with a little jitter, and a
/// short artificial delay so loading states are visible.
pub fn spawn_fake_provider(tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let mut rng = rand::thread_rng();
        let _ = tx.send(Delta::Log("[INFO] Offline mode: demo data only".to_string()));

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                ProviderCommand::FetchTeams { .. } => {
                    thread::sleep(Duration::from_millis(rng.gen_range(100..300)));
                    let _ = tx.send(Delta::SetTeams(demo_teams()));
                }
                ProviderCommand::FetchPlayers => {
                    thread::sleep(Duration::from_millis(rng.gen_range(100..300)));
                    let _ = tx.send(Delta::SetPlayers(demo_players()));
                }
                ProviderCommand::Predict { home, away, token } => {
                    let tx = tx.clone();
                    let delay = Duration::from_millis(rng.gen_range(200..700));
                    let result = fake_prediction(&home, &away, &mut rng);
                    thread::spawn(move || {
                        thread::sleep(delay);
                        let _ = tx.send(Delta::PredictionSettled {
                            token,
                            outcome: Ok(result),
                        });
                    });
                }
                ProviderCommand::TriggerIngest => {
                    thread::sleep(Duration::from_millis(rng.gen_range(300..800)));
                    let _ = tx.send(Delta::IngestFinished(Ok("demo data refreshed".to_string())));
                }
            }
        }
    });
}

fn demo_teams() -> Vec<TeamRef> {
    DEMO_TEAMS
        .iter()
        .map(|(id, name)| TeamRef {
            id: (*id).to_string(),
            name: (*name).to_string(),
            crest: Some(format!("https://crests.football-data.org/{id}.png")),
        })
        .collect()
}

fn demo_players() -> Vec<PlayerRef> {
    DEMO_PLAYERS
        .iter()
        .map(|(id, name, position, team)| PlayerRef {
            id: (*id).to_string(),
            name: (*name).to_string(),
            position: (*position).to_string(),
            team: Some((*team).to_string()),
        })
        .collect()
}

/// Home advantage plus per-team weight and a little noise, normalized so the
/// three outcomes sum to one.
fn fake_prediction(home: &str, away: &str, rng: &mut impl Rng) -> PredictionResult {
    let home_w = 1.2 + seed_weight(home) + rng.gen_range(0.0..0.4);
    let draw_w = 0.8 + rng.gen_range(0.0..0.2);
    let away_w = 0.9 + seed_weight(away) + rng.gen_range(0.0..0.4);
    let total = home_w + draw_w + away_w;
    PredictionResult {
        home_win: home_w / total,
        draw: draw_w / total,
        away_win: away_w / total,
    }
}

fn seed_weight(id: &str) -> f64 {
    (id.bytes().map(u64::from).sum::<u64>() % 7) as f64 / 10.0
}
