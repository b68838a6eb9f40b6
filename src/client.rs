use std::io::{Error, ErrorKind};

use crate::{resp::*, Connection};
use bytes::Bytes;
use tokio::net::{TcpStream, ToSocketAddrs};

/// Minimal client issuing `GET` and `SET` over one connection.
pub struct Client {
    connection: Connection,
}

impl Client {
    pub async fn connect<T: ToSocketAddrs>(addr: T) -> crate::Result<Self> {
        Ok(Client {
            connection: Connection::new(TcpStream::connect(addr).await?),
        })
    }

    /// `Ok(None)` when the key does not exist.
    pub async fn get(&mut self, key: &str) -> crate::Result<Option<Bytes>> {
        let frame = command(&[&b"get"[..], key.as_bytes()]);
        self.connection.write_frame(&frame).await?;

        match self.read_response().await? {
            RESPType::Bulk(value) => Ok(Some(value)),
            RESPType::String(value) => Ok(Some(value.into())),
            RESPType::Null => Ok(None),
            other => Err(format!("unexpected resp data type: {:?}", other).into()),
        }
    }

    pub async fn set(&mut self, key: &str, value: Bytes) -> crate::Result<()> {
        let frame = command(&[&b"set"[..], key.as_bytes(), &value[..]]);
        self.connection.write_frame(&frame).await?;

        match self.read_response().await? {
            RESPType::String(status) if status == "OK" => Ok(()),
            other => Err(format!("unexpected resp data type: {:?}", other).into()),
        }
    }

    async fn read_response(&mut self) -> crate::Result<RESPType> {
        match self.connection.read_frame().await? {
            Some(RESPType::Error(err)) => Err(err.into()),
            Some(frame) => Ok(frame),
            None => {
                let err = Error::new(ErrorKind::ConnectionReset, "connection reset by server");
                Err(err.into())
            }
        }
    }
}

fn command(parts: &[&[u8]]) -> RESPType {
    RESPType::Array(
        parts
            .iter()
            .map(|part| RESPType::Bulk(Bytes::copy_from_slice(part)))
            .collect(),
    )
}
