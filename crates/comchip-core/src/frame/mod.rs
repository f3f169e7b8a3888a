//! COMChip battery-status frame decoding.
//!
//! A status frame is a fixed-length record: sync byte `0x55`, command id,
//! status byte, big-endian voltage, an optional secondary status byte and a
//! trailing checksum seeded with the command id. The parser checks length,
//! sync, command id (when the layout pins one) and checksum, in that order,
//! and only then decodes the status bits.
//!
//! Layouts differ between firmware revisions (frame length, status bit
//! positions, checksum span), so they are values passed to the parser rather
//! than constants. Byte offsets and presets live in `layout`, bounds-checked
//! access in `reader`.
//!
//! Version française (résumé):
//! Le module valide une trame d'état batterie (longueur, octet de synchro,
//! identifiant de commande, somme de contrôle) puis décode les bits d'état et
//! la tension. La disposition de la trame est une valeur passée au parseur.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use parser::decode;

