/// Белорусская валютно-фондовая биржа (bcse.by)
pub mod bcse;
