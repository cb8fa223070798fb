use bitflags::bitflags;

use data_error::{Result, StreamError};

mod file;
mod memory;
mod socket;
mod span;
mod view;

pub use file::FileDevice;
pub use memory::MemoryDevice;
pub use socket::SocketDevice;
pub use span::SpanDevice;
pub use view::MemoryViewDevice;

bitflags! {
    /// Access mode a device is opened with.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OpenMode: u8 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        /// Every write lands at the end of the data.
        const APPEND = 1 << 2;
        /// Existing data is discarded on open.
        const TRUNCATE = 1 << 3;
        const READ_WRITE = Self::READ.bits() | Self::WRITE.bits();
    }
}

impl OpenMode {
    pub const fn is_readable(self) -> bool {
        self.contains(Self::READ)
    }

    pub const fn is_writable(self) -> bool {
        self.contains(Self::WRITE)
    }

    pub const fn is_append(self) -> bool {
        self.contains(Self::APPEND)
    }

    /// Reject combinations that cannot describe a usable device.
    pub fn validate(self) -> Result<Self> {
        if !self.intersects(Self::READ_WRITE) {
            return Err(StreamError::InvalidArgument(
                "open mode must include read or write access".to_owned(),
            ));
        }
        if self.intersects(Self::APPEND | Self::TRUNCATE) && !self.is_writable()
        {
            return Err(StreamError::InvalidArgument(
                "append and truncate require write access".to_owned(),
            ));
        }
        Ok(self)
    }

    pub(crate) fn check_read(self) -> Result<()> {
        if self.is_readable() {
            Ok(())
        } else {
            Err(StreamError::AccessMode("reading"))
        }
    }

    pub(crate) fn check_write(self) -> Result<()> {
        if self.is_writable() {
            Ok(())
        } else {
            Err(StreamError::AccessMode("writing"))
        }
    }
}

impl Default for OpenMode {
    fn default() -> Self {
        Self::READ_WRITE
    }
}
