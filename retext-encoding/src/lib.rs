/*!
Encoding utilities for vectorized text matching.

## Features
- [ASCII](ascii) scan utils
- UTF-8 [position mapping and transcoding](utf8)
- [Wide (UTF-32) subject buffers](wide)
- Byte- and character-level [case conversion](case)

These are the pieces of text handling that sit below pattern matching
proper: deciding what a buffer is encoded as, converting it to the form a
matching engine expects, and translating engine-reported byte offsets back
into user-visible character positions.
*/

pub mod ascii;
pub mod case;
pub mod utf8;
pub mod wide;
