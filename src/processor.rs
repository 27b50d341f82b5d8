//! Turns one received datagram into one reply, in place. Every packet ends
//! in one of three outcomes: dropped (None), a header-only error reply, or
//! a reply carrying a single answer record.

use crate::buffer::PacketBuffer;
use crate::protocol::{
    Header, Question, ADDITIONAL_COUNT_INDEX, ANSWER_COUNT_INDEX, AUTHORITY_COUNT_INDEX,
    FLAGS_INDEX, FLAG_AA, FLAG_QR, HEADER_LEN, QUESTION_COUNT_INDEX, RCODE_NAME_ERROR,
    RCODE_NOT_IMPLEMENTED, TYPE_PTR,
};
use crate::table::RecordTable;

/// Decodes the query in `buffer`, answers it against `table` and rebuilds
/// the buffer into the reply. Returns the number of bytes to send back, or
/// None when the packet must be ignored.
pub fn process_packet(
    table: &RecordTable,
    ttl: u32,
    buffer: &mut PacketBuffer,
    packet_len: usize,
) -> Option<usize> {
    buffer.at(0);
    let header = Header::from(buffer);
    if header.question_count == 0 {
        info!("packet has 0 queries, ignored");
        return None;
    }
    if header.is_response() {
        info!("response packet, ignored");
        return None;
    }
    // Only the first question is considered; the reply always claims
    // exactly one question.
    let question = match Question::from(buffer, packet_len) {
        Some(question) => question,
        None => {
            info!("malformed question, ignored");
            return None;
        }
    };
    let answer_offset = HEADER_LEN + question.encoded_len();

    let mut reply_flags = FLAG_QR | RCODE_NOT_IMPLEMENTED;
    let mut reply_len = answer_offset;
    if question.is_supported() && header.is_standard_query() {
        info!("{}", question.readable_name());
        match lookup(table, &question) {
            Some(data) => {
                buffer.at(answer_offset);
                // The answer name is a verbatim repeat of the question,
                // and type/class ride along with it.
                buffer.copy_forward(HEADER_LEN, question.encoded_len());
                buffer.put_u32(ttl);
                buffer.put_u16(data.len() as u16);
                buffer.put_slice(&data);
                reply_len = buffer.get_current_index();
                buffer.set_u16(ANSWER_COUNT_INDEX, 1);
                reply_flags = FLAG_QR | FLAG_AA;
            }
            None => {
                reply_flags = FLAG_QR | FLAG_AA | RCODE_NAME_ERROR;
            }
        }
    }
    buffer.set_u16(FLAGS_INDEX, header.flags | reply_flags);
    buffer.set_u16(QUESTION_COUNT_INDEX, 1);
    buffer.set_u16(AUTHORITY_COUNT_INDEX, 0);
    buffer.set_u16(ADDITIONAL_COUNT_INDEX, 0);
    Some(reply_len)
}

/// Resource data for the answer record: the four address octets for a
/// forward query, the entry's encoded name with its root terminator for a
/// reverse query.
fn lookup(table: &RecordTable, question: &Question) -> Option<Vec<u8>> {
    if question._type == TYPE_PTR {
        table.lookup_by_reversed(&question.name).map(|name| {
            let mut data = Vec::with_capacity(name.len() + 1);
            data.extend(name);
            data.push(0);
            data
        })
    } else {
        table.lookup_by_name(&question.name).map(|ip| ip.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{encode_name, CLASS_IN, TYPE_A};

    const TEST_TTL: u32 = 120;

    #[test]
    fn should_append_address_answer_when_process_given_known_name() {
        let query = get_test_query("foo.example.com", TYPE_A, CLASS_IN, 0x0100, 1);
        let question_len = query.len() - HEADER_LEN;

        let (result, buffer) = process(&query, &get_test_table());

        let answer_offset = query.len();
        let expected_len = answer_offset + question_len + 4 + 2 + 4;
        assert_eq!(Some(expected_len), result);
        // QR and AA added to the echoed flags, rcode 0
        assert_eq!(&[0x85, 0x00], buffer.slice(2, 4));
        assert_eq!(&[0x00, 0x01], buffer.slice(4, 6));
        assert_eq!(&[0x00, 0x01], buffer.slice(6, 8));
        // answer repeats the question verbatim
        assert_eq!(
            buffer.slice(HEADER_LEN, answer_offset),
            buffer.slice(answer_offset, answer_offset + question_len)
        );
        let tail = buffer.slice(answer_offset + question_len, expected_len);
        assert_eq!(&[0, 0, 0, 120, 0, 4, 10, 0, 0, 1], tail);
    }

    #[test]
    fn should_reply_name_error_when_process_given_unknown_name() {
        let query = get_test_query("bar.example.com", TYPE_A, CLASS_IN, 0x0100, 1);

        let (result, buffer) = process(&query, &get_test_table());

        assert_eq!(Some(query.len()), result);
        // QR, AA, rcode 3, no answers
        assert_eq!(&[0x85, 0x03], buffer.slice(2, 4));
        assert_eq!(&[0x00, 0x00], buffer.slice(6, 8));
    }

    #[test]
    fn should_reply_not_implemented_when_process_given_mx_type() {
        let query = get_test_query("foo.example.com", 15, CLASS_IN, 0x0100, 1);

        let (result, buffer) = process(&query, &get_test_table());

        assert_eq!(Some(query.len()), result);
        // QR, rcode 4, no AA, no answers
        assert_eq!(&[0x81, 0x04], buffer.slice(2, 4));
        assert_eq!(&[0x00, 0x00], buffer.slice(6, 8));
    }

    #[test]
    fn should_reply_not_implemented_when_process_given_chaos_class() {
        let query = get_test_query("foo.example.com", TYPE_A, 3, 0x0100, 1);

        let (_, buffer) = process(&query, &get_test_table());

        assert_eq!(&[0x81, 0x04], buffer.slice(2, 4));
    }

    #[test]
    fn should_reply_not_implemented_when_process_given_inverse_opcode() {
        let query = get_test_query("foo.example.com", TYPE_A, CLASS_IN, 0x0800, 1);

        let (result, buffer) = process(&query, &get_test_table());

        assert_eq!(Some(query.len()), result);
        assert_eq!(&[0x88, 0x04], buffer.slice(2, 4));
    }

    #[test]
    fn should_append_name_answer_when_process_given_reverse_query() {
        let query = get_test_query("1.0.0.10.in-addr.arpa", TYPE_PTR, CLASS_IN, 0x0100, 1);
        let question_len = query.len() - HEADER_LEN;

        let (result, buffer) = process(&query, &get_test_table());

        let mut expected_data = encode_name("foo.example.com");
        expected_data.push(0);
        let answer_offset = query.len();
        let expected_len = answer_offset + question_len + 4 + 2 + expected_data.len();
        assert_eq!(Some(expected_len), result);
        assert_eq!(&[0x85, 0x00], buffer.slice(2, 4));
        assert_eq!(&[0x00, 0x01], buffer.slice(6, 8));
        let rdata_offset = answer_offset + question_len + 4 + 2;
        assert_eq!(
            &[0, expected_data.len() as u8],
            buffer.slice(rdata_offset - 2, rdata_offset)
        );
        assert_eq!(&expected_data[..], buffer.slice(rdata_offset, expected_len));
    }

    #[test]
    fn should_drop_packet_when_process_given_response_flag() {
        let query = get_test_query("foo.example.com", TYPE_A, CLASS_IN, 0x8180, 1);

        let (result, _) = process(&query, &get_test_table());

        assert_eq!(None, result);
    }

    #[test]
    fn should_drop_packet_when_process_given_zero_questions() {
        let query = get_test_query("foo.example.com", TYPE_A, CLASS_IN, 0x0100, 0);

        let (result, _) = process(&query, &get_test_table());

        assert_eq!(None, result);
    }

    #[test]
    fn should_drop_packet_when_process_given_unterminated_name() {
        let mut query = Vec::new();
        query.extend(&[0x12, 0x34, 0x01, 0x00, 0x00, 0x01]);
        query.extend(&[0u8; 6]);
        query.extend(&[9, b'u', b'n', b'f']);

        let (result, _) = process(&query, &get_test_table());

        assert_eq!(None, result);
    }

    #[test]
    fn should_force_one_question_when_process_given_two_question_counts() {
        let query = get_test_query("foo.example.com", TYPE_A, CLASS_IN, 0x0100, 2);

        let (result, buffer) = process(&query, &get_test_table());

        assert!(result.is_some());
        assert_eq!(&[0x00, 0x01], buffer.slice(4, 6));
    }

    #[test]
    fn should_zero_tail_counts_when_process_given_nonzero_counts() {
        let mut query = get_test_query("foo.example.com", TYPE_A, CLASS_IN, 0x0100, 1);
        query[8..10].copy_from_slice(&5u16.to_be_bytes());
        query[10..12].copy_from_slice(&7u16.to_be_bytes());

        let (_, buffer) = process(&query, &get_test_table());

        assert_eq!(&[0, 0, 0, 0], buffer.slice(8, 12));
    }

    #[test]
    fn should_answer_with_wildcard_data_when_process_given_wildcard_table() {
        let table = RecordTable::from_pairs(vec![(
            "*".to_string(),
            "10.1.2.3".to_string(),
        )]);
        let query = get_test_query("anything.example", TYPE_A, CLASS_IN, 0x0100, 1);

        let (result, buffer) = process(&query, &table);

        let expected_len = query.len() + (query.len() - HEADER_LEN) + 4 + 2 + 4;
        assert_eq!(Some(expected_len), result);
        assert_eq!(&[10, 1, 2, 3], buffer.slice(expected_len - 4, expected_len));
    }

    fn get_test_table() -> RecordTable {
        RecordTable::from_pairs(vec![(
            "foo.example.com".to_string(),
            "10.0.0.1".to_string(),
        )])
    }

    fn get_test_query(
        domain: &str,
        _type: u16,
        class: u16,
        flags: u16,
        question_count: u16,
    ) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend(&0x1234u16.to_be_bytes());
        bytes.extend(&flags.to_be_bytes());
        bytes.extend(&question_count.to_be_bytes());
        bytes.extend(&[0u8; 6]);
        bytes.extend(encode_name(domain));
        bytes.push(0);
        bytes.extend(&_type.to_be_bytes());
        bytes.extend(&class.to_be_bytes());
        bytes
    }

    fn process(bytes: &[u8], table: &RecordTable) -> (Option<usize>, PacketBuffer) {
        let mut buffer = PacketBuffer::new();
        buffer.as_recv_slice()[..bytes.len()].copy_from_slice(bytes);
        let result = process_packet(table, TEST_TTL, &mut buffer, bytes.len());
        (result, buffer)
    }
}
