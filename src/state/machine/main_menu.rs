use crate::state::machine::{ConnState, StateResult};
use crate::state::session::Session;

const MENU: &str = "\
Main menu
---------
  1) Enter the game
  2) Create a character
  3) Change password
  4) Quit";

pub async fn run(sess: &mut Session) -> StateResult {
    if sess.is_disconnected() {
        return Ok(ConnState::Quit);
    }

    loop {
        sess.output.line(MENU).await;
        let choice = sess.prompt("> ").await?;

        let next = match choice.to_lowercase().as_str() {
            "1" | "enter" | "play" => ConnState::EnterGame,
            "2" | "create" => ConnState::CharacterCreate,
            "3" | "password" => ConnState::ChangePassword,
            "4" | "quit" | "q" => {
                sess.output.system("Goodbye.").await;
                ConnState::Quit
            }
            "" => continue,
            _ => {
                sess.output.system("Please choose 1-4.").await;
                continue;
            }
        };
        return Ok(next);
    }
}
