pub mod config_cmd;
pub mod invoke_cmd;
pub mod lambda_cmd;
pub mod output;
