// src/tokenizer/final_flag.rs
use std::iter::Peekable;

/// Adds `with_final_flag` to any iterator.
pub trait WithFinalFlag: Iterator + Sized {
    fn with_final_flag(self) -> FinalFlag<Self>;
}

impl<I> WithFinalFlag for I
where
    I: Iterator,
{
    fn with_final_flag(self) -> FinalFlag<Self> {
        FinalFlag {
            iter: self.peekable(),
        }
    }
}

/// Yields `(is_final, item)`; only the last item of the sequence is final.
///
/// Pieces of a word are formatted and looked up differently depending on
/// whether they end the word, which is what this is for.
pub struct FinalFlag<I>
where
    I: Iterator,
{
    iter: Peekable<I>,
}

impl<I> Iterator for FinalFlag<I>
where
    I: Iterator,
{
    type Item = (bool, I::Item);

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.iter.next()?;
        Some((self.iter.peek().is_none(), item))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}
