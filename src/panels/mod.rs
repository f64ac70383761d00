//! Side panels
//!
//! Each panel is a plain model built from graph state plus a render function
//! taking `&mut Ui`. Panels never own or mutate graph state.

mod detail;
mod legend;
mod ring_table;

pub use detail::{
    account_detail_panel, AccountDetail, FlagBadge, EMPTY_DETAIL_PROMPT, NO_SCORE_TEXT, PLACEHOLDER_NOTE,
};
pub use legend::{graph_summary_text, legend_strip};
pub use ring_table::{pattern_icon, ring_table_panel, RingRow, RingTable, EMPTY_TABLE_MESSAGE};
