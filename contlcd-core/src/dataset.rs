use std::iter::Iterator;

/// Sequential cursor over a [`Dataset`], yielding items until the first
/// index the dataset cannot serve.
pub struct DatasetIterator<'a, I> {
    current: usize,
    dataset: &'a dyn Dataset<I>,
}

impl<'a, I> DatasetIterator<'a, I> {
    pub fn new<D>(dataset: &'a D) -> Self
    where
        D: Dataset<I>,
    {
        Self::starting_at(dataset, 0)
    }

    pub fn starting_at<D>(dataset: &'a D, current: usize) -> Self
    where
        D: Dataset<I>,
    {
        DatasetIterator { current, dataset }
    }

    /// Index the next call to `next` will request.
    pub fn position(&self) -> usize {
        self.current
    }
}

impl<'a, I> Iterator for DatasetIterator<'a, I> {
    type Item = I;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.dataset.get(self.current)?;
        self.current += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.dataset.len().saturating_sub(self.current)))
    }
}

pub trait Dataset<I>: Send + Sync {
    fn get(&self, index: usize) -> Option<I>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn iter(&self) -> DatasetIterator<'_, I>
    where
        Self: Sized,
    {
        DatasetIterator::new(self)
    }
}
