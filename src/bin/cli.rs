use bytes::Bytes;
use clap::{Parser, Subcommand};
use sharded_kv::{Client, DEFAULT_PORT};
use std::convert::Infallible;

#[derive(Parser, Debug)]
#[command(disable_help_flag = true)]
struct Cli {
    #[clap(subcommand)]
    cmd: Command,
    #[clap(short = 'h', long = "hostname", default_value = "127.0.0.1")]
    host: String,
    #[clap(short = 'p', long = "port", default_value_t = DEFAULT_PORT)]
    port: u16,
}

#[derive(Subcommand, Debug)]
enum Command {
    Get {
        key: String,
    },
    Set {
        key: String,
        #[clap(value_parser = bytes_from_str)]
        value: Bytes,
    },
}

#[tokio::main]
async fn main() -> sharded_kv::Result<()> {
    let args = Cli::parse();
    let addr = format!("{}:{}", args.host, args.port);
    let mut client = Client::connect(addr).await?;

    match args.cmd {
        Command::Get { key } => match client.get(&key).await? {
            Some(value) => println!("{:?}", String::from_utf8_lossy(&value)),
            None => println!("(nil)"),
        },
        Command::Set { key, value } => {
            client.set(&key, value).await?;
            println!("OK");
        }
    }
    Ok(())
}

fn bytes_from_str(src: &str) -> Result<Bytes, Infallible> {
    Ok(Bytes::from(src.to_string()))
}
