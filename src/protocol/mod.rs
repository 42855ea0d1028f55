//! The wire protocol (spec section 6): ASCII line grammar, fixed binary
//! signature frames, and a small buffered reader that bridges the two.

mod framed;
mod messages;

pub use framed::FramedReader;
pub use messages::{
    basename, format_block_data, format_block_req, format_file_hdr, parse_block_frame_line,
    parse_block_req_count, parse_block_req_indices, parse_header_line, BlockDataHeader,
    BlockFrame, Header, BLOCK_END_LINE, FILE_OK_LINE,
};
