pub const BANNER: &str = r#"
  ____                          _
 / ___| _ __  _ __ __ ___      _| |
 \___ \| '_ \| '__/ _` \ \ /\ / / |
  ___) | |_) | | | (_| |\ V  V /| |
 |____/| .__/|_|  \__,_| \_/\_/ |_|
       |_|
"#;

pub const ENTRY: &str = r#"
Welcome to the Sprawl
Neon, rain and chrome, all the way down
------------------------------------------------
Log in with your account name, or type `new`
to register one.
------------------------------------------------
"#;
