use clap::Parser;

use crate::{constants::game, utils::version};

#[derive(Parser, Debug)]
#[command(author, version = version(), about)]
pub struct Cli {
    #[arg(
        short,
        long,
        value_name = "FLOAT",
        help = "Simulation ticks per second",
        default_value_t = game::TICK_RATE
    )]
    pub tick_rate: f64,

    #[arg(
        short,
        long,
        value_name = "FLOAT",
        help = "Frames per second",
        default_value_t = game::FRAME_RATE
    )]
    pub frame_rate: f64,
}
