pub mod buffer;
pub mod general;

#[cfg(test)]
mod buffer_tests {
    use crate::buffer::RingBuffer;

    #[test]
    fn test_ringbuffer_empty() {
        let x: RingBuffer<i32> = RingBuffer::new(5);
        assert!(x.is_empty());
        assert!(x.last().is_none());
        assert_eq!(x.iter().count(), 0);
    }
    #[test]
    fn test_ringbuffer_below_capacity() {
        let mut x: RingBuffer<i32> = RingBuffer::new(5);
        x.push(3);
        x.push(4);
        assert_eq!(x.len(), 2);
        assert_eq!(x.last(), Some(&4));
        assert_eq!(x.iter().copied().collect::<Vec<i32>>(), vec![3, 4]);
    }
    #[test]
    fn test_ringbuffer_overwrite() {
        let mut x: RingBuffer<i32> = RingBuffer::new(5);
        for val in [3, 4, 2, 1, 5, 10] {
            x.push(val);
        }
        assert_eq!(x.len(), 5);
        assert_eq!(x.last(), Some(&10));
        assert_eq!(x.iter().copied().collect::<Vec<i32>>(), vec![4, 2, 1, 5, 10]);
    }
    #[test]
    fn test_ringbuffer_iter_order() {
        let mut x: RingBuffer<i32> = RingBuffer::new(3);
        for val in 1..=5 {
            x.push(val);
        }
        assert_eq!(x.len(), 3);
        assert_eq!(x.iter().copied().collect::<Vec<i32>>(), vec![3, 4, 5]);
        assert_eq!(x.last(), Some(&5));
    }
    #[test]
    fn test_ringbuffer_non_numeric() {
        let mut x: RingBuffer<String> = RingBuffer::new(2);
        x.push("a".to_owned());
        x.push("b".to_owned());
        x.push("c".to_owned());
        assert_eq!(x.iter().cloned().collect::<Vec<String>>(), vec!["b", "c"]);
        x.clear();
        assert!(x.is_empty());
    }
    #[test]
    fn test_ringbuffer_zero_capacity() {
        let mut x: RingBuffer<f64> = RingBuffer::new(0);
        x.push(1.5);
        assert_eq!(x.len(), 1);
    }
}
