//! Configuration storage in flash
//!
//! Uses sequential-storage for wear-leveled key-value storage in the last
//! 64KB of flash, which memory.x keeps out of the program image.

use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

/// Flash size on the target board (2MB)
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;
/// Size of the config partition at the end of flash
pub const CONFIG_PARTITION_SIZE: usize = 64 * 1024;

const CONFIG_RANGE: core::ops::Range<u32> =
    ((FLASH_SIZE - CONFIG_PARTITION_SIZE) as u32)..(FLASH_SIZE as u32);

/// Key of the engine configuration record
const ENGINE_CONFIG_KEY: u8 = 0;

/// Scratch space for one stored item (key, length header, value)
const ITEM_BUFFER_SIZE: usize = 128;

/// Errors from flash storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum StorageError {
    /// Flash or map operation failed
    Storage,
    /// Stored value larger than the caller's buffer
    BufferTooSmall,
}

pub struct ConfigStorage<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
}

impl<'d> ConfigStorage<'d> {
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
        }
    }

    /// Read the stored config blob into `buffer`
    ///
    /// Returns `Ok(None)` if nothing has been stored yet.
    pub async fn read<'b>(&mut self, buffer: &'b mut [u8]) -> Result<Option<&'b [u8]>, StorageError> {
        let mut data_buffer = [0u8; ITEM_BUFFER_SIZE];

        let result = map::fetch_item::<u8, &[u8], _>(
            &mut self.flash,
            CONFIG_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &ENGINE_CONFIG_KEY,
        )
        .await;

        match result {
            Ok(Some(data)) => {
                let out = buffer
                    .get_mut(..data.len())
                    .ok_or(StorageError::BufferTooSmall)?;
                out.copy_from_slice(data);
                Ok(Some(out))
            }
            Ok(None) => Ok(None),
            Err(_) => Err(StorageError::Storage),
        }
    }

    /// Store a config blob, replacing any previous one
    pub async fn write(&mut self, data: &[u8]) -> Result<(), StorageError> {
        let mut data_buffer = [0u8; ITEM_BUFFER_SIZE];

        map::store_item(
            &mut self.flash,
            CONFIG_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &ENGINE_CONFIG_KEY,
            &data,
        )
        .await
        .map_err(|_| StorageError::Storage)
    }
}
