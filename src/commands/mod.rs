pub type CmdResult<T> = tokenfix::Result<(T, i32)>;

pub(crate) struct GlobalArgs {}

pub mod rules;
pub mod run;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (tokenfix::Result<serde_json::Value>, i32) {
    crate::tty::status("tokenfix is working...");

    match command {
        crate::Commands::Run(args) => dispatch!(args, global, run),
        crate::Commands::Rules(args) => dispatch!(args, global, rules),
    }
}
