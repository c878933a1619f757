use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use crate::directory_fetch;
use crate::predict_fetch;
use crate::state::{Delta, ProviderCommand};

/// Spawn the live provider.
///
/// Purely reactive: every fetch is triggered by a command from the UI and
/// answered with exactly one delta, so the UI's in-flight states always
/// terminate. Each command runs on its own short-lived worker thread so a
/// slow prediction never blocks a directory reload, and superseded
/// predictions can still be in flight while the newest one runs; staleness
/// is resolved on the UI side by token.
pub fn spawn_provider(tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            let tx = tx.clone();
            match cmd {
                ProviderCommand::FetchTeams { competition } => {
                    thread::spawn(move || {
                        let delta = match directory_fetch::fetch_teams(competition.as_deref()) {
                            Ok(teams) => Delta::SetTeams(teams),
                            Err(err) => Delta::TeamsFailed(err),
                        };
                        let _ = tx.send(delta);
                    });
                }
                ProviderCommand::FetchPlayers => {
                    thread::spawn(move || {
                        let delta = match directory_fetch::fetch_players() {
                            Ok(players) => Delta::SetPlayers(players),
                            Err(err) => Delta::PlayersFailed(err),
                        };
                        let _ = tx.send(delta);
                    });
                }
                ProviderCommand::Predict { home, away, token } => {
                    thread::spawn(move || {
                        let outcome = predict_fetch::predict_match(&home, &away);
                        let _ = tx.send(Delta::PredictionSettled { token, outcome });
                    });
                }
                ProviderCommand::TriggerIngest => {
                    thread::spawn(move || {
                        let _ = tx.send(Delta::IngestFinished(predict_fetch::trigger_ingest()));
                    });
                }
            }
        }
    });
}
