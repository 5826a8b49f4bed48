use crate::commands::{CmdCtx, Command, CommandError, CommandResult};
use crate::services::navigator;
use async_trait::async_trait;

/// Direction commands and their short forms.
pub const DIRECTIONS: [(&str, &[&str]); 12] = [
    ("north", &["n"]),
    ("south", &["s"]),
    ("east", &["e"]),
    ("west", &["w"]),
    ("northeast", &["ne"]),
    ("northwest", &["nw"]),
    ("southeast", &["se"]),
    ("southwest", &["sw"]),
    ("up", &["u"]),
    ("down", &["d"]),
    ("in", &[]),
    ("out", &[]),
];

/// `go <dir>`, or a bare direction.
pub struct Go;

#[async_trait]
impl Command for Go {
    async fn run(&self, ctx: &CmdCtx, invoked: &str, args: &[String]) -> CommandResult {
        let dir = if invoked == "go" {
            match args.first() {
                Some(dir) => dir.as_str(),
                None => return Err(CommandError::Usage("go <direction>")),
            }
        } else {
            invoked
        };

        let target = navigator::go(&ctx.character, &ctx.room, dir).await?;
        let view = ctx.registry.presenter.render_room(&target, &ctx.character);
        ctx.output.line(view).await;
        Ok(())
    }
}
