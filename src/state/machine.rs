//! The per-connection lifecycle.
//!
//! Each state is handled by one function that does its own I/O and returns the next state.
//! `run` keeps stepping until a terminal state is reached and always ends with the output
//! channel closed.

use crate::error::SessionError;
use crate::state::session::Session;

mod change_password;
mod character_create;
mod enter_game;
mod exit_game;
mod game_loop;
mod login;
mod main_menu;
mod registration;
mod welcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    Welcome,
    Login,
    Registration,
    MainMenu,
    ChangePassword,
    CharacterCreate,
    EnterGame,
    GameLoop,
    ExitGame,
    Quit,
    Error,
}

impl ConnState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConnState::Quit | ConnState::Error)
    }
}

pub type StateResult = Result<ConnState, SessionError>;

async fn handle(state: ConnState, sess: &mut Session) -> StateResult {
    match state {
        ConnState::Welcome => welcome::run(sess).await,
        ConnState::Login => login::run(sess).await,
        ConnState::Registration => registration::run(sess).await,
        ConnState::MainMenu => main_menu::run(sess).await,
        ConnState::ChangePassword => change_password::run(sess).await,
        ConnState::CharacterCreate => character_create::run(sess).await,
        ConnState::EnterGame => enter_game::run(sess).await,
        ConnState::GameLoop => game_loop::run(sess).await,
        ConnState::ExitGame => exit_game::run(sess).await,
        ConnState::Quit | ConnState::Error => Ok(state),
    }
}

/// Decide where to go after a state handler returned.
fn next_state(current: ConnState, result: StateResult, sess: &Session) -> ConnState {
    let in_game = sess.character.is_some();
    match result {
        // a dropped connection still gets a clean exit from the game, then stops
        Ok(ConnState::MainMenu) if sess.is_disconnected() => ConnState::Quit,
        Ok(next) => next,
        Err(SessionError::Disconnected) if in_game => ConnState::ExitGame,
        Err(SessionError::Disconnected) => ConnState::Quit,
        Err(SessionError::Domain(e)) => {
            tracing::error!(peer = %sess.peer, account = %sess.account_name(), state = ?current, error = %e, "session error");
            if in_game { ConnState::ExitGame } else { ConnState::Error }
        }
    }
}

/// Drive a session until it quits or fails.
pub async fn run(mut sess: Session) {
    let mut state = ConnState::Welcome;

    while !state.is_terminal() {
        let result = handle(state, &mut sess).await;
        let next = next_state(state, result, &sess);
        tracing::trace!(peer = %sess.peer, from = ?state, to = ?next, "state change");
        state = next;
    }

    if state == ConnState::Error {
        sess.output.system("Something went wrong. Goodbye.").await;
    }
    tracing::debug!(peer = %sess.peer, account = %sess.account_name(), ?state, "session finished");
    sess.output.close().await;
}
