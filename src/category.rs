use bitflags::bitflags;

bitflags! {
    /// Operations a device, filter or composed pipeline supports.
    ///
    /// Every [`Stream`](crate::Stream) declares its category as an
    /// associated constant, so the set is known at compile time and
    /// composition can be checked before any I/O happens.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Category: u8 {
        const INPUT = 1 << 0;
        const INPUT_SEEKABLE = 1 << 1;
        const OUTPUT = 1 << 2;
        const OUTPUT_SEEKABLE = 1 << 3;
        const HAS_SIZE = 1 << 4;
        const FLUSHABLE = 1 << 5;
        const HAS_EOF = 1 << 6;
        const HAS_STATUS = 1 << 7;
    }
}

impl Category {
    pub const fn is_input(self) -> bool {
        self.contains(Self::INPUT)
    }

    pub const fn is_input_seekable(self) -> bool {
        self.contains(Self::INPUT_SEEKABLE)
    }

    pub const fn is_output(self) -> bool {
        self.contains(Self::OUTPUT)
    }

    pub const fn is_output_seekable(self) -> bool {
        self.contains(Self::OUTPUT_SEEKABLE)
    }

    pub const fn has_size(self) -> bool {
        self.contains(Self::HAS_SIZE)
    }

    pub const fn is_flushable(self) -> bool {
        self.contains(Self::FLUSHABLE)
    }

    pub const fn has_eof(self) -> bool {
        self.contains(Self::HAS_EOF)
    }

    pub const fn has_status(self) -> bool {
        self.contains(Self::HAS_STATUS)
    }

    /// Human readable name of a single capability,
    /// used in [`StreamError::Unsupported`](data_error::StreamError).
    pub fn name(self) -> &'static str {
        CAPABILITY_NAMES
            .iter()
            .find(|(flag, _)| *flag == self)
            .map(|(_, name)| *name)
            .unwrap_or("a combination of capabilities")
    }
}

const CAPABILITY_NAMES: [(Category, &str); 8] = [
    (Category::INPUT, "readable"),
    (Category::INPUT_SEEKABLE, "input seekable"),
    (Category::OUTPUT, "writable"),
    (Category::OUTPUT_SEEKABLE, "output seekable"),
    (Category::HAS_SIZE, "sized"),
    (Category::FLUSHABLE, "flushable"),
    (Category::HAS_EOF, "eof-aware"),
    (Category::HAS_STATUS, "status-aware"),
];
