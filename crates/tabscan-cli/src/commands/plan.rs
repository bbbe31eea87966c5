use std::num::NonZeroUsize;

use tabscan_core::error::TabscanError;
use tabscan_core::split::plan_partitions;

pub fn run(pages: usize, threshold: usize) -> Result<(), TabscanError> {
    let threshold = NonZeroUsize::new(threshold).ok_or_else(|| {
        TabscanError::InvalidConfig("threshold must be greater than zero".into())
    })?;

    let plan = plan_partitions(pages, threshold);
    if !plan.split {
        match plan.partitions.first() {
            Some(p) => println!("No split: pages {p} processed in place"),
            None => println!("No pages to process"),
        }
        return Ok(());
    }

    println!("Split into {} partition(s):", plan.partitions.len());
    for (i, p) in plan.partitions.iter().enumerate() {
        println!("  part{:<3} {}  ({} pages)", i + 1, p, p.page_count());
    }
    Ok(())
}
